//! LED patterns understood by the robot.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// An LED pattern name.
///
/// The set is open: names the robot may support beyond the known ones are
/// carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum LedPattern {
    /// Idle pattern shown when the remote starts
    #[default]
    Breathing,
    Dance,
    Rainbow,
    Pulse,
    Chase,
    Wave,
    Other(String),
}

/// Patterns intended for use while the robot dances
pub const DANCE_PATTERNS: [LedPattern; 5] = [
    LedPattern::Dance,
    LedPattern::Rainbow,
    LedPattern::Pulse,
    LedPattern::Chase,
    LedPattern::Wave,
];

impl LedPattern {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Breathing => "breathing",
            Self::Dance => "dance",
            Self::Rainbow => "rainbow",
            Self::Pulse => "pulse",
            Self::Chase => "chase",
            Self::Wave => "wave",
            Self::Other(name) => name,
        }
    }

    /// Whether this is one of the patterns the remote knows by name
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl FromStr for LedPattern {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "breathing" => Self::Breathing,
            "dance" => Self::Dance,
            "rainbow" => Self::Rainbow,
            "pulse" => Self::Pulse,
            "chase" => Self::Chase,
            "wave" => Self::Wave,
            other => Self::Other(other.to_string()),
        })
    }
}

impl From<&str> for LedPattern {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(pattern) => pattern,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for LedPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_patterns() {
        for name in ["breathing", "dance", "rainbow", "pulse", "chase", "wave"] {
            let pattern = LedPattern::from(name);
            assert!(pattern.is_known(), "{name} should be known");
            assert_eq!(pattern.as_str(), name);
        }
    }

    #[test]
    fn test_unknown_pattern_passes_through() {
        let pattern = LedPattern::from("strobe");
        assert_eq!(pattern, LedPattern::Other("strobe".to_string()));
        assert!(!pattern.is_known());
        assert_eq!(pattern.to_string(), "strobe");
    }

    #[test]
    fn test_default_is_breathing() {
        assert_eq!(LedPattern::default(), LedPattern::Breathing);
    }

    #[test]
    fn test_dance_patterns_exclude_idle() {
        assert!(!DANCE_PATTERNS.contains(&LedPattern::Breathing));
        assert_eq!(DANCE_PATTERNS.len(), 5);
    }
}
