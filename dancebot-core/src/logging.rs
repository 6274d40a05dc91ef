//! Tracing setup shared by the relay and remote binaries.

use crate::paths::{config_path, log_file_path};
use serde::Deserialize;
use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Deserialize, Default)]
struct LoggingSection {
    #[serde(default)]
    enabled: bool,
}

#[derive(Deserialize)]
struct LoggingOnly {
    #[serde(default)]
    logging: LoggingSection,
}

/// Whether `[logging] enabled = true` is set in the config file.
///
/// Read ahead of [`DancebotConfig`](crate::DancebotConfig) so tracing is up
/// before config errors are reported. A missing or malformed file reads as
/// disabled.
#[must_use]
pub fn file_logging_enabled() -> bool {
    fs::read_to_string(config_path()).is_ok_and(|content| logging_enabled_in(&content))
}

fn logging_enabled_in(content: &str) -> bool {
    toml::from_str::<LoggingOnly>(content).is_ok_and(|c| c.logging.enabled)
}

/// Create (truncating) the log file, making its directory as needed
fn open_log_file(path: &Path) -> Option<File> {
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    match File::create(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Cannot log to {}: {e}", path.display());
            None
        }
    }
}

/// Install the global subscriber: console always, plus
/// `~/.config/dancebot/<name>.log` when `to_file` is set and the file opens
pub fn init_tracing(name: &str, to_file: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let file_layer = to_file
        .then(|| open_log_file(&log_file_path(name)))
        .flatten()
        .map(|file| {
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false)
        });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_logging_enabled_in_config() {
        assert!(logging_enabled_in("[logging]\nenabled = true\n"));
        assert!(!logging_enabled_in("[logging]\nenabled = false\n"));
    }

    #[test]
    fn test_logging_disabled_without_section() {
        assert!(!logging_enabled_in(""));
        assert!(!logging_enabled_in("[relay]\nport = 3000\n"));
    }

    #[test]
    fn test_logging_disabled_on_malformed_config() {
        assert!(!logging_enabled_in("[logging\nenabled = true"));
        assert!(!logging_enabled_in("[logging]\nenabled = \"yes\"\n"));
    }

    #[test]
    fn test_open_log_file_creates_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("dancebot-remote.log");

        assert!(open_log_file(&path).is_some());
        assert!(path.exists());
    }

    #[test]
    fn test_open_log_file_fails_on_directory() {
        let dir = tempdir().unwrap();

        assert!(open_log_file(dir.path()).is_none());
    }
}
