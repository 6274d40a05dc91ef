//! Text messages exchanged over the control link.
//!
//! Every message is a single WebSocket text frame:
//!
//! | Frame | Meaning |
//! |-------|---------|
//! | `song:<name>` | playback of `<name>` has started |
//! | `stop` | playback stopped or reset |
//! | `pause` | playback paused |
//! | `resume` | playback resumed |
//! | `led:<pattern>` | LED pattern change |
//! | `<integer>` | step tick |

use crate::error::CoreError;
use crate::led::LedPattern;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

/// Period between step ticks while a song plays
pub const STEP_INTERVAL: Duration = Duration::from_secs(5);

/// Greeting the relay sends to every client on connect
pub const GREETING: &str = "Connected to WebSocket server";

/// Range of the random step sent for uploaded songs
pub const UPLOADED_STEP_RANGE: RangeInclusive<u32> = 1..=18;

/// Range of values the relay logs as step signals
pub const RELAY_STEP_RANGE: RangeInclusive<i64> = 1..=10;

const SONG_PREFIX: &str = "song:";
const LED_PREFIX: &str = "led:";

/// A command sent from the remote to the robot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlMessage {
    Song(String),
    Stop,
    Pause,
    Resume,
    Led(LedPattern),
    Step(u32),
}

impl fmt::Display for ControlMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Song(name) => write!(f, "{SONG_PREFIX}{name}"),
            Self::Stop => f.write_str("stop"),
            Self::Pause => f.write_str("pause"),
            Self::Resume => f.write_str("resume"),
            Self::Led(pattern) => write!(f, "{LED_PREFIX}{pattern}"),
            Self::Step(step) => write!(f, "{step}"),
        }
    }
}

impl FromStr for ControlMessage {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stop" => return Ok(Self::Stop),
            "pause" => return Ok(Self::Pause),
            "resume" => return Ok(Self::Resume),
            _ => {}
        }

        if let Some(name) = s.strip_prefix(SONG_PREFIX) {
            return Ok(Self::Song(name.to_string()));
        }
        if let Some(pattern) = s.strip_prefix(LED_PREFIX) {
            return Ok(Self::Led(LedPattern::from(pattern)));
        }
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(step) = s.parse() {
                return Ok(Self::Step(step));
            }
        }

        Err(CoreError::InvalidMessage {
            message: s.to_string(),
        })
    }
}

/// Parse the leading integer of `text` the way a browser's `parseInt` does.
///
/// Leading whitespace and one sign are skipped, a `0x` prefix switches to
/// hexadecimal, and parsing stops at the first non-digit. Returns `None` when
/// no digit is found or the value does not fit in an `i64`.
#[must_use]
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let rest = text.trim_start();
    let (negative, rest) = match rest.as_bytes().first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };

    let (radix, digits) = match rest.get(..2) {
        Some("0x" | "0X") => (16, &rest[2..]),
        _ => (10, rest),
    };

    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_digit(radix))
        .map_or(digits.len(), |(i, _)| i);
    if end == 0 {
        return None;
    }

    let value = i64::from_str_radix(&digits[..end], radix).ok()?;
    Some(if negative { -value } else { value })
}

/// Step value the relay logs for an inbound message, if any
#[must_use]
pub fn relay_step_signal(text: &str) -> Option<i64> {
    parse_leading_int(text).filter(|value| RELAY_STEP_RANGE.contains(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_messages() {
        assert_eq!(ControlMessage::Song("Track A".into()).to_string(), "song:Track A");
        assert_eq!(ControlMessage::Stop.to_string(), "stop");
        assert_eq!(ControlMessage::Pause.to_string(), "pause");
        assert_eq!(ControlMessage::Resume.to_string(), "resume");
        assert_eq!(ControlMessage::Led(LedPattern::Rainbow).to_string(), "led:rainbow");
        assert_eq!(ControlMessage::Step(7).to_string(), "7");
    }

    #[test]
    fn test_parse_messages() {
        assert_eq!(
            "song:Falling For You".parse::<ControlMessage>().unwrap(),
            ControlMessage::Song("Falling For You".into())
        );
        assert_eq!("stop".parse::<ControlMessage>().unwrap(), ControlMessage::Stop);
        assert_eq!(
            "led:sparkle".parse::<ControlMessage>().unwrap(),
            ControlMessage::Led(LedPattern::Other("sparkle".into()))
        );
        assert_eq!("18".parse::<ControlMessage>().unwrap(), ControlMessage::Step(18));
    }

    #[test]
    fn test_song_name_may_contain_colon() {
        assert_eq!(
            "song:Live: Remix".parse::<ControlMessage>().unwrap(),
            ControlMessage::Song("Live: Remix".into())
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("start".parse::<ControlMessage>().is_err());
        assert!("".parse::<ControlMessage>().is_err());
        assert!("-3".parse::<ControlMessage>().is_err());
        assert!("STOP".parse::<ControlMessage>().is_err());
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("7"), Some(7));
        assert_eq!(parse_leading_int("  12"), Some(12));
        assert_eq!(parse_leading_int("3abc"), Some(3));
        assert_eq!(parse_leading_int("4.9"), Some(4));
        assert_eq!(parse_leading_int("-2"), Some(-2));
        assert_eq!(parse_leading_int("+9"), Some(9));
        assert_eq!(parse_leading_int("0x0A"), Some(10));
        assert_eq!(parse_leading_int("song:Track A"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int("0x"), None);
        assert_eq!(parse_leading_int("99999999999999999999999"), None);
    }

    #[test]
    fn test_relay_step_signal_range() {
        assert_eq!(relay_step_signal("7"), Some(7));
        assert_eq!(relay_step_signal("1"), Some(1));
        assert_eq!(relay_step_signal("10"), Some(10));
        assert_eq!(relay_step_signal("0"), None);
        assert_eq!(relay_step_signal("11"), None);
        assert_eq!(relay_step_signal("18"), None);
        assert_eq!(relay_step_signal("song:Track A"), None);
        assert_eq!(relay_step_signal("stop"), None);
    }
}
