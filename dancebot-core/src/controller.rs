//! Playback state machine driving the robot's step signals.
//!
//! The controller owns the current song, the step counter and at most one
//! step timer. The timer is a field rather than a spawned task: whoever
//! drives the controller awaits [`PlaybackController::wait_timer`] in the
//! same loop that applies user commands, so every transition finishes
//! (state updated, control message sent) before the next tick is seen.

use crate::led::LedPattern;
use crate::link::ControlLink;
use crate::player::MediaPlayer;
use crate::protocol::{ControlMessage, UPLOADED_STEP_RANGE};
use crate::song::SongRef;
use crate::status::StatusEvent;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

/// Playback state of the current song
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Nothing loaded, or stopped
    #[default]
    Idle,
    /// Loaded but not started
    Loaded,
    Playing,
    Paused,
    /// Played through to the end
    Ended,
}

/// Timer-driven events the controller waits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// The step timer fired
    Tick,
    /// The song reached its end
    Ended,
}

/// Playback controller
pub struct PlaybackController {
    state: PlaybackState,
    current: Option<SongRef>,
    /// Next sequential step for catalog songs
    step: u32,
    /// Step timer; `Some` iff `state == Playing`
    ticker: Option<Interval>,
    step_interval: Duration,
    player: Box<dyn MediaPlayer>,
    link: Arc<dyn ControlLink>,
    led_pattern: LedPattern,
    status: Option<StatusEvent>,
    status_tx: broadcast::Sender<StatusEvent>,
}

impl PlaybackController {
    /// Create a controller with no song loaded
    #[must_use]
    pub fn new(
        link: Arc<dyn ControlLink>,
        player: Box<dyn MediaPlayer>,
        step_interval: Duration,
    ) -> Self {
        let (status_tx, _) = broadcast::channel(64);

        Self {
            state: PlaybackState::Idle,
            current: None,
            step: 1,
            ticker: None,
            step_interval,
            player,
            link,
            led_pattern: LedPattern::default(),
            status: None,
            status_tx,
        }
    }

    /// Subscribe to status events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.status_tx.subscribe()
    }

    #[must_use]
    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    #[must_use]
    pub const fn current_song(&self) -> Option<&SongRef> {
        self.current.as_ref()
    }

    /// The step value the next catalog tick will send
    #[must_use]
    pub const fn next_step(&self) -> u32 {
        self.step
    }

    #[must_use]
    pub const fn has_active_timer(&self) -> bool {
        self.ticker.is_some()
    }

    #[must_use]
    pub const fn led_pattern(&self) -> &LedPattern {
        &self.led_pattern
    }

    /// Most recent status
    #[must_use]
    pub const fn status(&self) -> Option<&StatusEvent> {
        self.status.as_ref()
    }

    /// Current playback position of the local player
    #[must_use]
    pub fn position(&self) -> Duration {
        self.player.position()
    }

    /// Load a song without playing it
    pub fn preload(&mut self, song: SongRef) {
        self.cancel_timer();
        self.step = 1;
        self.player.load(&song);

        let name = song.name.clone();
        self.current = Some(song);
        self.state = PlaybackState::Loaded;

        self.report(StatusEvent::Loaded { name });
        self.send(&ControlMessage::Stop);
    }

    /// Play a song.
    ///
    /// The current song resumes if paused and is left alone if playing. Any
    /// other song, or the current one when idle, loaded or ended, starts over
    /// from position zero.
    pub fn play(&mut self, song: SongRef) {
        if let Some(current) = &self.current {
            if current.is_same_song(&song) {
                match self.state {
                    PlaybackState::Paused => {
                        self.resume();
                        return;
                    }
                    PlaybackState::Playing => {
                        debug!("{} is already playing", song.name);
                        return;
                    }
                    PlaybackState::Idle | PlaybackState::Loaded | PlaybackState::Ended => {}
                }
            }
        }

        self.cancel_timer();
        self.step = 1;
        self.player.load(&song);
        self.player.play();

        let name = song.name.clone();
        self.current = Some(song);
        self.state = PlaybackState::Playing;

        self.report(StatusEvent::Playing { name: name.clone() });
        if self.send(&ControlMessage::Song(name.clone())) {
            info!("Started new song: {}", name);
        }
        self.start_timer();
    }

    /// Pause the playing song. Returns `false` if nothing was playing.
    pub fn pause(&mut self) -> bool {
        if self.state != PlaybackState::Playing {
            debug!("Pause ignored in state {:?}", self.state);
            return false;
        }

        self.player.pause();
        self.cancel_timer();
        self.state = PlaybackState::Paused;

        let name = self.current_name();
        self.report(StatusEvent::Paused { name: name.clone() });
        if self.send(&ControlMessage::Pause) {
            info!("Song paused: {}", name);
        }
        true
    }

    /// Resume a paused song without resetting the step counter.
    /// Returns `false` if nothing was paused.
    pub fn resume(&mut self) -> bool {
        if self.state != PlaybackState::Paused {
            debug!("Resume ignored in state {:?}", self.state);
            return false;
        }

        self.player.play();
        self.state = PlaybackState::Playing;

        let name = self.current_name();
        self.report(StatusEvent::Playing { name: name.clone() });
        if self.send(&ControlMessage::Resume) {
            info!("Song resumed: {}", name);
        }
        self.start_timer();
        true
    }

    /// Stop playback and rewind to the start
    pub fn stop(&mut self) {
        self.player.pause();
        self.player.rewind();
        self.cancel_timer();
        self.step = 1;
        self.state = PlaybackState::Idle;

        let name = self.current_name();
        self.report(StatusEvent::Stopped { name: name.clone() });
        if self.send(&ControlMessage::Stop) {
            info!("Song stopped: {}", name);
        }
    }

    /// Stop and forget the current song
    pub fn unload(&mut self) {
        self.stop();
        self.current = None;
    }

    /// Ask the robot to switch LED pattern.
    ///
    /// Needs an open link; otherwise reports [`StatusEvent::LinkUnavailable`]
    /// and returns `false`.
    pub fn set_led_pattern(&mut self, pattern: LedPattern) -> bool {
        if !self.send(&ControlMessage::Led(pattern.clone())) {
            self.report(StatusEvent::LinkUnavailable);
            return false;
        }

        info!("LED pattern changed to: {}", pattern);
        self.led_pattern = pattern.clone();
        self.report(StatusEvent::LedChanged { pattern });
        true
    }

    /// Wait for the next timer event.
    ///
    /// Never resolves while nothing is playing. Cancel safe: dropping the
    /// future loses no tick.
    pub async fn wait_timer(&mut self) -> TimerEvent {
        let until_end = self
            .player
            .remaining()
            .filter(|_| self.state == PlaybackState::Playing);

        let Some(ticker) = self.ticker.as_mut() else {
            return std::future::pending().await;
        };

        match until_end {
            Some(remaining) => {
                tokio::select! {
                    biased;
                    () = tokio::time::sleep(remaining) => TimerEvent::Ended,
                    _ = ticker.tick() => TimerEvent::Tick,
                }
            }
            None => {
                ticker.tick().await;
                TimerEvent::Tick
            }
        }
    }

    /// Apply an event returned by [`PlaybackController::wait_timer`]
    pub fn handle_timer(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::Tick => self.on_tick(),
            TimerEvent::Ended => self.on_ended(),
        }
    }

    /// Send one step signal for the playing song
    pub fn on_tick(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        let Some(uploaded) = self.current.as_ref().map(SongRef::is_uploaded) else {
            return;
        };

        let step = if uploaded {
            let step = rand::rng().random_range(UPLOADED_STEP_RANGE);
            debug!("Sending random step signal for uploaded song: {}", step);
            step
        } else {
            let step = self.step;
            self.step += 1;
            debug!("Sending sequential step signal for catalog song: {}", step);
            step
        };

        self.send(&ControlMessage::Step(step));
    }

    /// Handle the song playing through to its end
    pub fn on_ended(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }

        self.player.pause();
        self.cancel_timer();
        self.step = 1;
        self.state = PlaybackState::Ended;

        let name = self.current_name();
        self.report(StatusEvent::Ended { name: name.clone() });
        if self.send(&ControlMessage::Stop) {
            info!("Song ended: {}", name);
        }
    }

    /// Publish a status update
    pub fn report(&mut self, status: StatusEvent) {
        let _ = self.status_tx.send(status.clone());
        self.status = Some(status);
    }

    fn current_name(&self) -> String {
        self.current
            .as_ref()
            .map(|s| s.name.clone())
            .unwrap_or_default()
    }

    /// Send over the link if it is open. Returns whether the message went out.
    fn send(&self, message: &ControlMessage) -> bool {
        if !self.link.is_open() {
            debug!("Control link not open, dropping {:?}", message.to_string());
            return false;
        }
        match self.link.send(message) {
            Ok(()) => true,
            Err(e) => {
                debug!("Failed to send {:?}: {}", message.to_string(), e);
                false
            }
        }
    }

    fn start_timer(&mut self) {
        // Replacing drops any previous interval, so at most one exists
        let mut ticker =
            tokio::time::interval_at(Instant::now() + self.step_interval, self.step_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.ticker = Some(ticker);
    }

    fn cancel_timer(&mut self) {
        self.ticker = None;
    }
}
