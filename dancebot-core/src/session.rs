//! The remote's user-facing operations: song selection, uploads and the
//! play/pause/stop buttons, layered over [`PlaybackController`].

use crate::controller::{PlaybackController, TimerEvent};
use crate::error::{CoreError, Result};
use crate::led::LedPattern;
use crate::song::SongRef;
use crate::status::StatusEvent;
use crate::uploads::{UploadReport, UploadedSongs};
use std::path::Path;
use tracing::warn;

pub struct RemoteSession {
    controller: PlaybackController,
    catalog: Vec<SongRef>,
    uploads: UploadedSongs,
}

impl RemoteSession {
    /// Create a session, preloading the first catalog song if there is one
    #[must_use]
    pub fn new(controller: PlaybackController, catalog: Vec<SongRef>) -> Self {
        let mut session = Self {
            controller,
            catalog,
            uploads: UploadedSongs::new(),
        };
        if let Some(first) = session.catalog.first().cloned() {
            session.controller.preload(first);
        }
        session
    }

    #[must_use]
    pub const fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PlaybackController {
        &mut self.controller
    }

    #[must_use]
    pub fn catalog(&self) -> &[SongRef] {
        &self.catalog
    }

    #[must_use]
    pub const fn uploads(&self) -> &UploadedSongs {
        &self.uploads
    }

    /// Pick a catalog song; loads it without playing.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SongIndexOutOfRange`] for an invalid index.
    pub fn select_catalog(&mut self, index: usize) -> Result<()> {
        let song = self
            .catalog
            .get(index)
            .cloned()
            .ok_or(CoreError::SongIndexOutOfRange {
                index,
                len: self.catalog.len(),
            })?;
        self.controller.preload(song);
        Ok(())
    }

    /// Start dancing to the current song, resuming it if paused.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoSongSelected`] if no song is loaded.
    pub fn start(&mut self) -> Result<()> {
        let song = self
            .controller
            .current_song()
            .cloned()
            .ok_or(CoreError::NoSongSelected)?;
        self.controller.play(song);
        Ok(())
    }

    /// Upload files, reporting what was added or rejected
    pub fn add_files<I, P>(&mut self, paths: I) -> UploadReport
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let report = self.uploads.add_files(paths);

        if let Some(notice) = report.rejection_notice() {
            warn!("{}", notice);
            self.controller.report(StatusEvent::UploadRejected { notice });
        }
        if !report.added.is_empty() {
            self.controller.report(StatusEvent::Added {
                count: report.added.len(),
            });
        }
        report
    }

    /// Play an uploaded song.
    ///
    /// The song already current is resumed if paused and left playing
    /// otherwise; any other song starts from the beginning.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SongIndexOutOfRange`] for an invalid index.
    pub fn play_uploaded(&mut self, index: usize) -> Result<()> {
        let song = self.uploads.get(index)?.clone();
        self.controller.play(song);
        Ok(())
    }

    pub fn pause(&mut self) -> bool {
        self.controller.pause()
    }

    pub fn resume(&mut self) -> bool {
        self.controller.resume()
    }

    pub fn stop(&mut self) {
        self.controller.stop();
    }

    /// Remove an uploaded song, stopping it first if it is current.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SongIndexOutOfRange`] for an invalid index.
    pub fn remove_uploaded(&mut self, index: usize) -> Result<SongRef> {
        let is_current = {
            let song = self.uploads.get(index)?;
            self.controller
                .current_song()
                .is_some_and(|current| current.is_same_song(song))
        };
        if is_current {
            self.controller.unload();
        }

        let song = self.uploads.remove(index)?;
        self.controller.report(StatusEvent::Removed {
            name: song.name.clone(),
        });
        Ok(song)
    }

    pub fn set_led_pattern(&mut self, pattern: LedPattern) -> bool {
        self.controller.set_led_pattern(pattern)
    }

    /// See [`PlaybackController::wait_timer`]
    pub async fn wait_timer(&mut self) -> TimerEvent {
        self.controller.wait_timer().await
    }

    pub fn handle_timer(&mut self, event: TimerEvent) {
        self.controller.handle_timer(event);
    }
}
