//! Song references for catalog and uploaded songs.

use lofty::file::AudioFile;
use lofty::probe::Probe;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Identifier generated for an uploaded song.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UploadId(String);

impl UploadId {
    /// Generate a fresh random identifier
    #[must_use]
    pub fn generate() -> Self {
        Self(nanoid::nanoid!())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a song came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SongOrigin {
    /// Pre-registered in the song selector, referenced by a static path
    Catalog,
    /// Added by the user at runtime, held for the session only
    Uploaded { id: UploadId, size: u64 },
}

/// A playable song
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongRef {
    /// Display name, also sent in `song:<name>`
    pub name: String,
    /// Path of the audio file
    pub source: PathBuf,
    pub origin: SongOrigin,
    /// Track length, if it could be determined
    pub duration: Option<Duration>,
}

impl SongRef {
    /// Create a catalog song reference
    #[must_use]
    pub fn catalog(name: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            origin: SongOrigin::Catalog,
            duration: None,
        }
    }

    /// Create an uploaded song reference with a freshly generated id
    #[must_use]
    pub fn uploaded(name: impl Into<String>, source: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            origin: SongOrigin::Uploaded {
                id: UploadId::generate(),
                size,
            },
            duration: None,
        }
    }

    /// Set a known duration
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Fill in the duration by probing the audio file
    #[must_use]
    pub fn probed(mut self) -> Self {
        self.duration = probe_duration(&self.source);
        self
    }

    #[must_use]
    pub const fn is_uploaded(&self) -> bool {
        matches!(self.origin, SongOrigin::Uploaded { .. })
    }

    /// Upload id, for uploaded songs
    #[must_use]
    pub const fn upload_id(&self) -> Option<&UploadId> {
        match &self.origin {
            SongOrigin::Uploaded { id, .. } => Some(id),
            SongOrigin::Catalog => None,
        }
    }

    /// Whether two references denote the same song.
    ///
    /// Uploaded songs compare by id; catalog songs by name and path.
    #[must_use]
    pub fn is_same_song(&self, other: &Self) -> bool {
        match (&self.origin, &other.origin) {
            (SongOrigin::Uploaded { id: a, .. }, SongOrigin::Uploaded { id: b, .. }) => a == b,
            (SongOrigin::Catalog, SongOrigin::Catalog) => {
                self.name == other.name && self.source == other.source
            }
            _ => false,
        }
    }
}

/// Read the playing time of an audio file.
///
/// Returns `None` if the file is missing or not a recognized audio format.
#[must_use]
pub fn probe_duration(path: &Path) -> Option<Duration> {
    let tagged = match Probe::open(path).and_then(|probe| probe.read()) {
        Ok(tagged) => tagged,
        Err(e) => {
            debug!("Could not probe {}: {}", path.display(), e);
            return None;
        }
    };

    let duration = tagged.properties().duration();
    (!duration.is_zero()).then_some(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_song() {
        let song = SongRef::catalog("Faded", "songs/faded.mp3");
        assert_eq!(song.name, "Faded");
        assert_eq!(song.origin, SongOrigin::Catalog);
        assert!(!song.is_uploaded());
        assert!(song.upload_id().is_none());
        assert!(song.duration.is_none());
    }

    #[test]
    fn test_uploaded_songs_get_distinct_ids() {
        let a = SongRef::uploaded("song.mp3", "/tmp/song.mp3", 1024);
        let b = SongRef::uploaded("song.mp3", "/tmp/song.mp3", 1024);

        assert!(a.is_uploaded());
        assert_ne!(a.upload_id(), b.upload_id());
        assert!(!a.is_same_song(&b));
        assert!(a.is_same_song(&a.clone()));
    }

    #[test]
    fn test_catalog_identity_by_name_and_path() {
        let a = SongRef::catalog("Alone", "songs/alone.mp3");
        let b = SongRef::catalog("Alone", "songs/alone.mp3").with_duration(Duration::from_secs(200));
        let c = SongRef::catalog("Alone", "songs/other.mp3");

        assert!(a.is_same_song(&b));
        assert!(!a.is_same_song(&c));
    }

    #[test]
    fn test_catalog_never_matches_upload() {
        let catalog = SongRef::catalog("song.mp3", "/tmp/song.mp3");
        let uploaded = SongRef::uploaded("song.mp3", "/tmp/song.mp3", 10);
        assert!(!catalog.is_same_song(&uploaded));
        assert!(!uploaded.is_same_song(&catalog));
    }

    #[test]
    fn test_probe_missing_file() {
        assert!(probe_duration(Path::new("/definitely/not/here.mp3")).is_none());
    }
}
