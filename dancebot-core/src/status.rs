use crate::led::LedPattern;
use std::fmt;

/// User-visible status updates emitted by the remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    /// A song was loaded without playing
    Loaded { name: String },
    /// Playback started or resumed
    Playing { name: String },
    Paused { name: String },
    Stopped { name: String },
    /// The song played to its end
    Ended { name: String },
    /// Uploaded songs were added
    Added { count: usize },
    /// An uploaded song was removed
    Removed { name: String },
    /// Some uploads were rejected; carries the aggregated notice
    UploadRejected { notice: String },
    LedChanged { pattern: LedPattern },
    /// A command needed the control link but it is not open
    LinkUnavailable,
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded { name } => write!(f, "Loaded: {name}"),
            Self::Playing { .. } => f.write_str("Song Playing..."),
            Self::Paused { name } => write!(f, "Paused: {name}"),
            Self::Stopped { name } => write!(f, "Stopped: {name}"),
            Self::Ended { name } => write!(f, "Ended: {name}"),
            Self::Added { count } => {
                write!(f, "Added {count} song{}.", if *count == 1 { "" } else { "s" })
            }
            Self::Removed { name } => write!(f, "Removed: {name}"),
            Self::UploadRejected { notice } => f.write_str(notice),
            Self::LedChanged { pattern } => {
                write!(f, "LED pattern: {}", pattern.as_str().to_uppercase())
            }
            Self::LinkUnavailable => f.write_str("WebSocket not connected!"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_texts() {
        let name = || "Track A".to_string();
        assert_eq!(StatusEvent::Loaded { name: name() }.to_string(), "Loaded: Track A");
        assert_eq!(StatusEvent::Playing { name: name() }.to_string(), "Song Playing...");
        assert_eq!(StatusEvent::Paused { name: name() }.to_string(), "Paused: Track A");
        assert_eq!(StatusEvent::Stopped { name: name() }.to_string(), "Stopped: Track A");
        assert_eq!(StatusEvent::Ended { name: name() }.to_string(), "Ended: Track A");
        assert_eq!(StatusEvent::Removed { name: name() }.to_string(), "Removed: Track A");
    }

    #[test]
    fn test_added_pluralization() {
        assert_eq!(StatusEvent::Added { count: 1 }.to_string(), "Added 1 song.");
        assert_eq!(StatusEvent::Added { count: 3 }.to_string(), "Added 3 songs.");
    }

    #[test]
    fn test_led_status_uppercases() {
        let event = StatusEvent::LedChanged {
            pattern: LedPattern::Rainbow,
        };
        assert_eq!(event.to_string(), "LED pattern: RAINBOW");
        assert_eq!(StatusEvent::LinkUnavailable.to_string(), "WebSocket not connected!");
    }
}
