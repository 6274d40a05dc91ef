//! Line commands read from stdin.

use dancebot_core::LedPattern;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List catalog and uploaded songs
    Songs,
    /// Load a catalog song (0-based index)
    Select(usize),
    Upload(Vec<PathBuf>),
    /// Start dancing to the loaded song
    Start,
    /// Play an uploaded song (0-based index)
    Play(usize),
    Pause,
    Resume,
    Stop,
    /// Remove an uploaded song (0-based index)
    Remove(usize),
    Led(LedPattern),
    Status,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("`{command}` needs {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("Invalid song number {0:?}; numbers start at 1")]
    InvalidIndex(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(name, rest)| (name, rest.trim()));

        match name.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "songs" | "ls" => Ok(Self::Songs),
            "select" => parse_index("select", rest).map(Self::Select),
            "upload" => {
                let paths: Vec<PathBuf> = rest.split_whitespace().map(PathBuf::from).collect();
                if paths.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "upload",
                        expected: "one or more file paths",
                    });
                }
                Ok(Self::Upload(paths))
            }
            "start" => Ok(Self::Start),
            "play" => parse_index("play", rest).map(Self::Play),
            "pause" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            "stop" => Ok(Self::Stop),
            "remove" | "rm" => parse_index("remove", rest).map(Self::Remove),
            "led" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "led",
                        expected: "a pattern name",
                    });
                }
                Ok(Self::Led(LedPattern::from(rest)))
            }
            "status" => Ok(Self::Status),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Parse a 1-based song number into a 0-based index
fn parse_index(command: &'static str, arg: &str) -> Result<usize, CommandError> {
    if arg.is_empty() {
        return Err(CommandError::MissingArgument {
            command,
            expected: "a song number",
        });
    }
    match arg.parse::<usize>() {
        Ok(number) if number >= 1 => Ok(number - 1),
        _ => Err(CommandError::InvalidIndex(arg.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_commands() {
        assert_eq!("songs".parse(), Ok(Command::Songs));
        assert_eq!("  START ".parse(), Ok(Command::Start));
        assert_eq!("pause".parse(), Ok(Command::Pause));
        assert_eq!("resume".parse(), Ok(Command::Resume));
        assert_eq!("stop".parse(), Ok(Command::Stop));
        assert_eq!("status".parse(), Ok(Command::Status));
        assert_eq!("help".parse(), Ok(Command::Help));
        assert_eq!("quit".parse(), Ok(Command::Quit));
    }

    #[test]
    fn test_indices_are_one_based() {
        assert_eq!("select 1".parse(), Ok(Command::Select(0)));
        assert_eq!("play 3".parse(), Ok(Command::Play(2)));
        assert_eq!("remove  2".parse(), Ok(Command::Remove(1)));
    }

    #[test]
    fn test_invalid_indices() {
        assert_eq!(
            "select 0".parse::<Command>(),
            Err(CommandError::InvalidIndex("0".into()))
        );
        assert_eq!(
            "play two".parse::<Command>(),
            Err(CommandError::InvalidIndex("two".into()))
        );
        assert!(matches!(
            "remove".parse::<Command>(),
            Err(CommandError::MissingArgument { command: "remove", .. })
        ));
    }

    #[test]
    fn test_upload_paths() {
        assert_eq!(
            "upload a.mp3 /music/b.mp3".parse(),
            Ok(Command::Upload(vec![
                PathBuf::from("a.mp3"),
                PathBuf::from("/music/b.mp3")
            ]))
        );
        assert!(matches!(
            "upload".parse::<Command>(),
            Err(CommandError::MissingArgument { command: "upload", .. })
        ));
    }

    #[test]
    fn test_led_pattern() {
        assert_eq!("led rainbow".parse(), Ok(Command::Led(LedPattern::Rainbow)));
        assert_eq!(
            "led sparkle".parse(),
            Ok(Command::Led(LedPattern::Other("sparkle".into())))
        );
        assert!("led".parse::<Command>().is_err());
    }

    #[test]
    fn test_empty_and_unknown() {
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!("   ".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!(
            "dance".parse::<Command>(),
            Err(CommandError::Unknown("dance".into()))
        );
    }
}
