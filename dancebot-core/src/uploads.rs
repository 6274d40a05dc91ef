//! Songs added by the user at runtime.

use crate::error::{CoreError, Result};
use crate::song::{SongOrigin, SongRef, UploadId};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// File extension accepted for uploads
pub const UPLOAD_EXTENSION: &str = "mp3";

/// Outcome of one upload batch
#[derive(Debug, Default)]
pub struct UploadReport {
    /// Songs appended to the collection, in order
    pub added: Vec<SongRef>,
    /// Names skipped because the same file was already uploaded
    pub duplicates: Vec<String>,
    /// Names skipped because they are not MP3 files
    pub rejected: Vec<String>,
    /// Names skipped because the file could not be read
    pub unreadable: Vec<String>,
}

impl UploadReport {
    /// Single aggregated notice naming every rejected file, if any
    #[must_use]
    pub fn rejection_notice(&self) -> Option<String> {
        if self.rejected.is_empty() {
            return None;
        }
        Some(format!(
            "These files are not MP3 format and were skipped:\n{}\n\nPlease upload only MP3 files.",
            self.rejected.join("\n")
        ))
    }
}

/// Ordered collection of uploaded songs, kept for the session only
#[derive(Debug, Default)]
pub struct UploadedSongs {
    songs: Vec<SongRef>,
}

impl UploadedSongs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and add a batch of files.
    ///
    /// Only `.mp3` files are accepted. A file with the same name and size as
    /// an existing upload is skipped.
    pub fn add_files<I, P>(&mut self, paths: I) -> UploadReport
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut report = UploadReport::default();

        for path in paths {
            let path = path.as_ref();
            let name = path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

            if !is_mp3(path) {
                report.rejected.push(name);
                continue;
            }

            let size = match fs::metadata(path) {
                Ok(meta) if meta.is_file() => meta.len(),
                Ok(_) => {
                    warn!("{} is not a regular file", path.display());
                    report.unreadable.push(name);
                    continue;
                }
                Err(e) => {
                    warn!("Cannot read {}: {}", path.display(), e);
                    report.unreadable.push(name);
                    continue;
                }
            };

            let song = SongRef::uploaded(&name, path, size).probed();
            if self.insert(song.clone()) {
                info!("Added file: {}", name);
                report.added.push(song);
            } else {
                info!("{} is already uploaded.", name);
                report.duplicates.push(name);
            }
        }

        report
    }

    /// Append a song unless one with the same name and size exists.
    ///
    /// Returns `false` for duplicates.
    pub fn insert(&mut self, song: SongRef) -> bool {
        if self.songs.iter().any(|s| same_file(s, &song)) {
            return false;
        }
        self.songs.push(song);
        true
    }

    /// Remove the song at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SongIndexOutOfRange`] for an invalid index.
    pub fn remove(&mut self, index: usize) -> Result<SongRef> {
        self.check_index(index)?;
        let song = self.songs.remove(index);
        info!("Removed file: {}", song.name);
        Ok(song)
    }

    /// Song at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SongIndexOutOfRange`] for an invalid index.
    pub fn get(&self, index: usize) -> Result<&SongRef> {
        self.check_index(index)?;
        Ok(&self.songs[index])
    }

    /// Current index of the upload with `id`
    #[must_use]
    pub fn position_of(&self, id: &UploadId) -> Option<usize> {
        self.songs.iter().position(|s| s.upload_id() == Some(id))
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &SongRef> {
        self.songs.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.songs.len() {
            return Err(CoreError::SongIndexOutOfRange {
                index,
                len: self.songs.len(),
            });
        }
        Ok(())
    }
}

fn is_mp3(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(UPLOAD_EXTENSION))
}

fn same_file(a: &SongRef, b: &SongRef) -> bool {
    match (&a.origin, &b.origin) {
        (SongOrigin::Uploaded { size: sa, .. }, SongOrigin::Uploaded { size: sb, .. }) => {
            a.name == b.name && sa == sb
        }
        _ => false,
    }
}
