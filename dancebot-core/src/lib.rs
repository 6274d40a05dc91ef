pub mod config;
pub mod controller;
pub mod error;
pub mod led;
pub mod link;
pub mod logging;
pub mod paths;
pub mod player;
pub mod protocol;
pub mod session;
pub mod song;
pub mod status;
pub mod time;
pub mod uploads;

#[cfg(test)]
mod test_fixture;

pub use config::{
    CatalogEntry, DancebotConfig, LoggingConfig, RelayConfig, RemoteConfig, CONFIG_TEMPLATE,
};

/// Re-export toml error type for config parsing error handling
pub use toml::de::Error as TomlParseError;
pub use controller::{PlaybackController, PlaybackState, TimerEvent};
pub use error::{CoreError, Result};
pub use led::{LedPattern, DANCE_PATTERNS};
pub use link::ControlLink;
pub use paths::{
    config_dir, config_path, log_file_path, CONFIG_DIR_NAME, CONFIG_FILE_NAME,
    LOG_FILE_EXTENSION,
};
pub use player::{ClockPlayer, MediaPlayer};
pub use protocol::{
    parse_leading_int, relay_step_signal, ControlMessage, GREETING, RELAY_STEP_RANGE,
    STEP_INTERVAL, UPLOADED_STEP_RANGE,
};
pub use session::RemoteSession;
pub use song::{SongOrigin, SongRef, UploadId};
pub use status::StatusEvent;
pub use time::DurationExt;
pub use uploads::{UploadReport, UploadedSongs, UPLOAD_EXTENSION};
