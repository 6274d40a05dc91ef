mod commands;
mod link;

use crate::commands::{Command, CommandError};
use crate::link::WsControlLink;
use dancebot_core::logging::{file_logging_enabled, init_tracing};
use dancebot_core::{
    ClockPlayer, ControlLink, CoreError, DancebotConfig, DurationExt, LedPattern,
    PlaybackController, RemoteSession, SongRef, StatusEvent, DANCE_PATTERNS,
};
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const APP_NAME: &str = "dancebot-remote";

fn main() {
    init_tracing(APP_NAME, file_logging_enabled());

    let config = match DancebotConfig::load_or_create() {
        Ok(config) => config,
        Err(CoreError::ConfigNotFound { path }) => {
            warn!(
                "Created config template at {}; starting with defaults",
                path.display()
            );
            DancebotConfig::default()
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    let cancel_token = CancellationToken::new();

    // Set up Ctrl+C handler to trigger graceful shutdown
    let ctrlc_token = cancel_token.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received Ctrl+C, shutting down gracefully...");
        ctrlc_token.cancel();
    }) {
        error!("Failed to set Ctrl+C handler: {}", e);
    }

    runtime.block_on(run(config, cancel_token));
}

/// Drive the session from stdin commands and the step timer until quit
async fn run(config: DancebotConfig, cancel_token: CancellationToken) {
    let link = Arc::new(WsControlLink::connect(&config.remote.robot_url).await);

    let controller = PlaybackController::new(
        Arc::clone(&link) as Arc<dyn ControlLink>,
        Box::new(ClockPlayer::new()),
        config.remote.step_interval(),
    );
    tokio::spawn(log_status_events(controller.subscribe()));

    let catalog = config.remote.catalog_songs(&DancebotConfig::config_dir());
    let mut session = RemoteSession::new(controller, catalog);

    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            () = cancel_token.cancelled() => break,
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if apply(&mut session, link.as_ref(), &line).is_break() {
                        break;
                    }
                }
                Ok(None) => {
                    info!("Input closed");
                    break;
                }
                Err(e) => {
                    error!("Failed to read input: {}", e);
                    break;
                }
            },
            event = session.wait_timer() => session.handle_timer(event),
        }
    }

    session.stop();
    link.close().await;
    info!("Remote stopped");
}

/// Apply one input line to the session
fn apply(session: &mut RemoteSession, link: &dyn ControlLink, line: &str) -> ControlFlow<()> {
    let command = match line.parse::<Command>() {
        Ok(command) => command,
        Err(CommandError::Empty) => return ControlFlow::Continue(()),
        Err(e) => {
            println!("{e}. Type `help` for the list of commands.");
            return ControlFlow::Continue(());
        }
    };

    match command {
        Command::Songs => print_songs(session),
        Command::Select(index) => report_error(session.select_catalog(index)),
        Command::Upload(paths) => {
            let report = session.add_files(&paths);
            for name in &report.duplicates {
                println!("{name} is already uploaded.");
            }
            for name in &report.unreadable {
                println!("Could not read {name}; skipped.");
            }
        }
        Command::Start => report_error(session.start()),
        Command::Play(index) => report_error(session.play_uploaded(index)),
        Command::Pause => {
            if !session.pause() {
                println!("Nothing is playing.");
            }
        }
        Command::Resume => {
            if !session.resume() {
                println!("Nothing is paused.");
            }
        }
        Command::Stop => session.stop(),
        Command::Remove(index) => report_error(session.remove_uploaded(index).map(|_| ())),
        Command::Led(pattern) => {
            if !pattern.is_known() {
                warn!("Unknown LED pattern {:?}; sending it anyway", pattern.as_str());
            }
            session.set_led_pattern(pattern);
        }
        Command::Status => print_status(session, link),
        Command::Help => print_help(),
        Command::Quit => return ControlFlow::Break(()),
    }

    ControlFlow::Continue(())
}

fn report_error(result: dancebot_core::Result<()>) {
    match result {
        Ok(()) => {}
        // Song numbers are shown 1-based
        Err(CoreError::SongIndexOutOfRange { index, len }) => {
            println!("There is no song {} (the list has {len}).", index + 1);
        }
        Err(e) => println!("{e}."),
    }
}

fn print_help() {
    let patterns: Vec<&str> = DANCE_PATTERNS.iter().map(LedPattern::as_str).collect();
    println!(
        "Commands:
  songs              list catalog and uploaded songs
  select <n>         load catalog song n
  start              start dancing to the loaded song
  upload <path>...   add MP3 files
  play <n>           play uploaded song n (again to resume)
  pause | resume | stop
  remove <n>         remove uploaded song n
  led <pattern>      set the LED pattern ({})
  status             show playback status
  help | quit",
        patterns.join(", ")
    );
}

fn print_songs(session: &RemoteSession) {
    let current = session.controller().current_song();
    let is_current = |song: &SongRef| current.is_some_and(|c| c.is_same_song(song));

    println!("Catalog:");
    for (i, song) in session.catalog().iter().enumerate() {
        println!("{}", song_line(i, song, is_current(song)));
    }

    if session.uploads().is_empty() {
        println!("No uploaded songs.");
    } else {
        println!("Uploaded:");
        for (i, song) in session.uploads().iter().enumerate() {
            println!("{}", song_line(i, song, is_current(song)));
        }
    }
}

fn song_line(index: usize, song: &SongRef, current: bool) -> String {
    let marker = if current { '>' } else { ' ' };
    let duration = song
        .duration
        .map(|d| format!(" ({})", d.to_clock_string()))
        .unwrap_or_default();
    format!("{marker} {:>2}. {}{duration}", index + 1, song.name)
}

fn print_status(session: &RemoteSession, link: &dyn ControlLink) {
    let controller = session.controller();

    println!("State: {:?}", controller.state());
    if let Some(song) = controller.current_song() {
        let position = controller.position().to_clock_string();
        match song.duration {
            Some(duration) => {
                println!("Song: {} [{position} / {}]", song.name, duration.to_clock_string());
            }
            None => println!("Song: {} [{position}]", song.name),
        }
    }
    println!("LED pattern: {}", controller.led_pattern());
    println!(
        "Robot: {}",
        if link.is_open() { "connected" } else { "not connected" }
    );
    if let Some(status) = controller.status() {
        println!("Status: {status}");
    }
}

/// Log all status events to the console
async fn log_status_events(mut rx: broadcast::Receiver<StatusEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => match &event {
                StatusEvent::LinkUnavailable | StatusEvent::UploadRejected { .. } => {
                    warn!("{}", event);
                }
                _ => info!("{}", event),
            },
            Err(RecvError::Closed) => {
                info!("Status channel closed");
                break;
            }
            Err(RecvError::Lagged(n)) => {
                info!("Missed {} status events", n);
            }
        }
    }
}
