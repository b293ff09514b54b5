//! Command line configuration of the binary.
//!
//! `tessera perft <depth> [<FEN>]` counts nodes, anything else starts an
//! interactive game configured by flags.

use crate::piece::Color;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown option {0}")]
    UnknownOption(String),
    #[error("missing value for {0}")]
    MissingValue(String),
    #[error("invalid value {value} for {option}")]
    InvalidValue { option: String, value: String },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}
impl Difficulty {
    /// Search depth used for each level
    pub fn depth(&self) -> u32 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }

    pub fn from_name(name: &str) -> Option<Difficulty> {
        match name.to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Play,
    Perft { depth: u32, fen: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub mode: Mode,
    pub depth: u32,
    pub threads: usize,
    pub player_color: Color,
    pub random_moves: bool,
    pub seed: Option<u64>,
    pub fen: Option<String>,
}
impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            mode: Mode::Play,
            depth: Difficulty::Medium.depth(),
            threads: 1,
            player_color: Color::White,
            random_moves: false,
            seed: None,
            fen: None,
        }
    }
}

impl EngineConfig {
    /// Reads the configuration from the program arguments, without the
    /// program name
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Result<EngineConfig, ConfigError> {
        let mut config = EngineConfig::default();
        let mut args = args.into_iter().peekable();

        if args.peek().map(String::as_str) == Some("perft") {
            args.next();
            let depth = parse_value("perft", args.next())?;
            let fen = args.next();
            if let Some(extra) = args.next() {
                return Err(ConfigError::UnknownOption(extra));
            }
            config.mode = Mode::Perft { depth, fen };
            return Ok(config);
        }

        while let Some(option) = args.next() {
            match option.as_str() {
                "--depth" => config.depth = parse_value(&option, args.next())?,
                "--difficulty" => {
                    let value = required(&option, args.next())?;
                    config.depth = Difficulty::from_name(&value)
                        .ok_or_else(|| invalid(&option, &value))?
                        .depth();
                }
                "--threads" => {
                    let threads: usize = parse_value(&option, args.next())?;
                    config.threads = threads.clamp(1, num_cpus::get());
                }
                "--color" => {
                    let value = required(&option, args.next())?;
                    config.player_color = match value.to_ascii_lowercase().as_str() {
                        "white" | "w" => Color::White,
                        "black" | "b" => Color::Black,
                        _ => return Err(invalid(&option, &value)),
                    }
                }
                "--random" => config.random_moves = true,
                "--seed" => config.seed = Some(parse_value(&option, args.next())?),
                "--fen" => config.fen = Some(required(&option, args.next())?),
                _ => return Err(ConfigError::UnknownOption(option)),
            }
        }
        Ok(config)
    }
}

fn required(option: &str, value: Option<String>) -> Result<String, ConfigError> {
    value.ok_or_else(|| ConfigError::MissingValue(option.to_string()))
}

fn invalid(option: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        option: option.to_string(),
        value: value.to_string(),
    }
}

fn parse_value<T: std::str::FromStr>(option: &str, value: Option<String>) -> Result<T, ConfigError> {
    let value = required(option, value)?;
    value.parse::<T>().map_err(|_| invalid(option, &value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<EngineConfig, ConfigError> {
        EngineConfig::from_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults_to_a_medium_game_as_white() {
        let config = parse(&[]).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.depth, 2);
        assert_eq!(config.mode, Mode::Play);
    }

    #[test]
    fn perft_mode() {
        assert_eq!(
            parse(&["perft", "3"]).unwrap().mode,
            Mode::Perft { depth: 3, fen: None }
        );
        let with_fen = parse(&["perft", "2", "8/8/4k3/8/8/3K4/8/8 w - - 0 1"]).unwrap();
        assert_eq!(
            with_fen.mode,
            Mode::Perft {
                depth: 2,
                fen: Some(String::from("8/8/4k3/8/8/3K4/8/8 w - - 0 1"))
            }
        );
        assert!(matches!(parse(&["perft"]), Err(ConfigError::MissingValue(_))));
        assert!(matches!(parse(&["perft", "x"]), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn play_options() {
        let config = parse(&["--difficulty", "hard", "--color", "black", "--random", "--seed", "42"]).unwrap();
        assert_eq!(config.depth, 3);
        assert_eq!(config.player_color, Color::Black);
        assert!(config.random_moves);
        assert_eq!(config.seed, Some(42));

        assert_eq!(parse(&["--depth", "4"]).unwrap().depth, 4);
        assert_eq!(parse(&["--threads", "0"]).unwrap().threads, 1);
        assert!(parse(&["--threads", "100000"]).unwrap().threads <= num_cpus::get());
    }

    #[test]
    fn bad_arguments() {
        assert_eq!(parse(&["--verbose"]), Err(ConfigError::UnknownOption(String::from("--verbose"))));
        assert!(matches!(parse(&["--depth"]), Err(ConfigError::MissingValue(_))));
        assert!(matches!(parse(&["--difficulty", "insane"]), Err(ConfigError::InvalidValue { .. })));
        assert!(matches!(parse(&["--color", "red"]), Err(ConfigError::InvalidValue { .. })));
    }
}
