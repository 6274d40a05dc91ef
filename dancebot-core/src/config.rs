use crate::error::{CoreError, Result};
use crate::protocol::{GREETING, STEP_INTERVAL};
use crate::song::SongRef;
use crate::time::DurationExt;
use const_format::concatcp;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default relay bind address (all interfaces)
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

/// Default relay port
pub const DEFAULT_RELAY_PORT: u16 = 3000;

/// Default robot control link address
pub const DEFAULT_ROBOT_URL: &str = "ws://192.168.8.190:81";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DancebotConfig {
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Text sent once to every newly connected client
    #[serde(default = "default_greeting")]
    pub greeting: String,
    /// Fan every text message out to the other connected clients
    #[serde(default)]
    pub forward_messages: bool,
}

fn default_bind_address() -> String {
    DEFAULT_BIND_ADDRESS.to_string()
}

const fn default_port() -> u16 {
    DEFAULT_RELAY_PORT
}

fn default_greeting() -> String {
    GREETING.to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            greeting: default_greeting(),
            forward_messages: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_robot_url")]
    pub robot_url: String,
    #[serde(default = "default_step_interval_ms")]
    pub step_interval_ms: u64,
    #[serde(default = "default_catalog")]
    pub catalog: Vec<CatalogEntry>,
}

fn default_robot_url() -> String {
    DEFAULT_ROBOT_URL.to_string()
}

fn default_step_interval_ms() -> u64 {
    STEP_INTERVAL.as_millis_u64()
}

fn default_catalog() -> Vec<CatalogEntry> {
    [
        ("Alone", "songs/alone.mp3"),
        ("Faded", "songs/faded.mp3"),
        ("Falling For You", "songs/fallingforyou.mp3"),
        ("Neural Threads", "songs/neural.mp3"),
        ("Titanium", "songs/titanium.mp3"),
        ("Stereo Love", "songs/stereo.mp3"),
    ]
    .into_iter()
    .map(|(name, path)| CatalogEntry {
        name: name.to_string(),
        path: PathBuf::from(path),
    })
    .collect()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            robot_url: default_robot_url(),
            step_interval_ms: default_step_interval_ms(),
            catalog: default_catalog(),
        }
    }
}

impl RemoteConfig {
    /// Period of the step timer
    #[must_use]
    pub const fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }

    /// Resolve catalog entries into song references.
    ///
    /// Relative paths are resolved against `base_dir`. Durations are probed
    /// from the files; missing files simply have no known duration.
    #[must_use]
    pub fn catalog_songs(&self, base_dir: &Path) -> Vec<SongRef> {
        self.catalog
            .iter()
            .map(|entry| {
                let path = if entry.path.is_absolute() {
                    entry.path.clone()
                } else {
                    base_dir.join(&entry.path)
                };
                SongRef::catalog(&entry.name, path).probed()
            })
            .collect()
    }
}

/// A song pre-registered in the song selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to ~/.config/dancebot/<binary>.log
    #[serde(default)]
    pub enabled: bool,
}

impl DancebotConfig {
    /// Get the configuration directory path (~/.config/dancebot/)
    #[must_use]
    pub fn config_dir() -> PathBuf {
        crate::paths::config_dir()
    }

    /// Get the config file path (~/.config/dancebot/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Load config from the default location, creating a template on first run.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigNotFound`] after writing the template, or an
    /// error if the file cannot be read, parsed or validated.
    pub fn load_or_create() -> Result<Self> {
        Self::load_or_create_at(&Self::config_path())
    }

    /// Load config from `config_path`, creating a template there if missing.
    ///
    /// # Errors
    ///
    /// See [`DancebotConfig::load_or_create`].
    pub fn load_or_create_at(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }

            fs::write(config_path, CONFIG_TEMPLATE)?;

            return Err(CoreError::ConfigNotFound {
                path: config_path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(config_path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a value is out of range.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges the type system cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigInvalid`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        if self.remote.step_interval_ms == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "remote.step_interval_ms must be greater than zero".into(),
            });
        }
        if !(self.remote.robot_url.starts_with("ws://")
            || self.remote.robot_url.starts_with("wss://"))
        {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "remote.robot_url must be a ws:// or wss:// URL, got {:?}",
                    self.remote.robot_url
                ),
            });
        }
        Ok(())
    }
}

/// Config template written on first run
pub const CONFIG_TEMPLATE: &str = concatcp!(
    r#"# Dancebot Configuration
# ~/.config/dancebot/config.toml

[relay]
bind_address = ""#,
    DEFAULT_BIND_ADDRESS,
    r#""
port = "#,
    DEFAULT_RELAY_PORT,
    r#"
# Sent once to every client on connect
greeting = ""#,
    GREETING,
    r#""
# Fan every text message out to the other connected clients
forward_messages = false

[remote]
# Control link of the robot (ESP32 WebSocket)
robot_url = ""#,
    DEFAULT_ROBOT_URL,
    r#""
step_interval_ms = 5000

# Catalog songs; relative paths are resolved against this directory
[[remote.catalog]]
name = "Alone"
path = "songs/alone.mp3"

[[remote.catalog]]
name = "Faded"
path = "songs/faded.mp3"

[[remote.catalog]]
name = "Falling For You"
path = "songs/fallingforyou.mp3"

[[remote.catalog]]
name = "Neural Threads"
path = "songs/neural.mp3"

[[remote.catalog]]
name = "Titanium"
path = "songs/titanium.mp3"

[[remote.catalog]]
name = "Stereo Love"
path = "songs/stereo.mp3"

[logging]
# Also write logs to ~/.config/dancebot/<binary>.log
enabled = false
"#
);
