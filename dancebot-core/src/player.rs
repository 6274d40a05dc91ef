//! Local playback tracking.

use crate::song::SongRef;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// The local audio player the controller drives.
pub trait MediaPlayer: Send {
    /// Load a song, paused at position zero
    fn load(&mut self, song: &SongRef);

    /// Start or continue playback from the current position
    fn play(&mut self);

    /// Pause, keeping the current position
    fn pause(&mut self);

    /// Move the position back to zero without changing play/pause
    fn rewind(&mut self);

    /// Current playback position
    fn position(&self) -> Duration;

    fn is_paused(&self) -> bool;

    /// Time until the song ends naturally.
    ///
    /// `None` while paused or when the song length is unknown.
    fn remaining(&self) -> Option<Duration>;
}

/// A player that tracks position with the runtime clock instead of
/// producing sound.
#[derive(Debug, Default)]
pub struct ClockPlayer {
    duration: Option<Duration>,
    /// Position accumulated up to the last pause
    offset: Duration,
    /// Set while playing
    started_at: Option<Instant>,
}

impl ClockPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn at_end(&self) -> bool {
        self.duration.is_some_and(|d| self.position() >= d)
    }
}

impl MediaPlayer for ClockPlayer {
    fn load(&mut self, song: &SongRef) {
        debug!("Loading {} ({:?})", song.source.display(), song.duration);
        self.duration = song.duration;
        self.offset = Duration::ZERO;
        self.started_at = None;
    }

    fn play(&mut self) {
        if self.started_at.is_some() {
            return;
        }
        // Playing a finished song starts it over
        if self.at_end() {
            self.offset = Duration::ZERO;
        }
        self.started_at = Some(Instant::now());
    }

    fn pause(&mut self) {
        self.offset = self.position();
        self.started_at = None;
    }

    fn rewind(&mut self) {
        self.offset = Duration::ZERO;
        if self.started_at.is_some() {
            self.started_at = Some(Instant::now());
        }
    }

    fn position(&self) -> Duration {
        let position = self.offset + self.started_at.map_or(Duration::ZERO, |t| t.elapsed());
        self.duration.map_or(position, |d| position.min(d))
    }

    fn is_paused(&self) -> bool {
        self.started_at.is_none()
    }

    fn remaining(&self) -> Option<Duration> {
        self.started_at?;
        self.duration.map(|d| d.saturating_sub(self.position()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(secs: u64) -> SongRef {
        SongRef::catalog("Test", "test.mp3").with_duration(Duration::from_secs(secs))
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_is_paused_at_zero() {
        let mut player = ClockPlayer::new();
        player.load(&song(60));

        assert!(player.is_paused());
        assert_eq!(player.position(), Duration::ZERO);
        assert_eq!(player.remaining(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_position_advances_while_playing() {
        let mut player = ClockPlayer::new();
        player.load(&song(60));
        player.play();

        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(player.position(), Duration::from_secs(10));
        assert_eq!(player.remaining(), Some(Duration::from_secs(50)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_keeps_position() {
        let mut player = ClockPlayer::new();
        player.load(&song(60));
        player.play();
        tokio::time::advance(Duration::from_secs(7)).await;
        player.pause();
        tokio::time::advance(Duration::from_secs(30)).await;

        assert_eq!(player.position(), Duration::from_secs(7));
        player.play();
        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(player.position(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rewind() {
        let mut player = ClockPlayer::new();
        player.load(&song(60));
        player.play();
        tokio::time::advance(Duration::from_secs(20)).await;
        player.rewind();

        assert_eq!(player.position(), Duration::ZERO);
        assert!(!player.is_paused());
    }

    #[tokio::test(start_paused = true)]
    async fn test_position_clamped_and_replay_restarts() {
        let mut player = ClockPlayer::new();
        player.load(&song(5));
        player.play();
        tokio::time::advance(Duration::from_secs(8)).await;

        assert_eq!(player.position(), Duration::from_secs(5));
        assert_eq!(player.remaining(), Some(Duration::ZERO));

        player.pause();
        player.play();
        assert_eq!(player.position(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_duration_never_ends() {
        let mut player = ClockPlayer::new();
        player.load(&SongRef::catalog("Unknown", "missing.mp3"));
        player.play();
        tokio::time::advance(Duration::from_secs(3600)).await;

        assert_eq!(player.remaining(), None);
        assert_eq!(player.position(), Duration::from_secs(3600));
    }
}
