use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // Configuration errors
    #[error("Config file not found at {path}. A template has been created.")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid config: {message}")]
    ConfigInvalid { message: String },

    #[error("Failed to parse config file: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    // Song selection errors
    #[error("No song at position {index} (list has {len})")]
    SongIndexOutOfRange { index: usize, len: usize },

    #[error("No song selected")]
    NoSongSelected,

    #[error("Invalid control message: {message:?}")]
    InvalidMessage { message: String },

    // Control link errors
    #[error("Control link is closed")]
    LinkClosed,

    // IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
