//! Severity levels understood by the logger.
//!
//! Levels form a total order from most severe ([`Level::Error`], ordinal 0)
//! to least severe ([`Level::Silly`], ordinal 8). A lower ordinal is more
//! severe, so "passes a minimum" means `ordinal(level) <= ordinal(minimum)`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
    Warn,
    Info,
    Success,
    Http,
    Db,
    Verbose,
    Debug,
    Silly,
}

/// Returned when a string does not name a known level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(pub String);

impl Level {
    /// Every level, most severe first.
    pub const ALL: [Level; 9] = [
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Success,
        Level::Http,
        Level::Db,
        Level::Verbose,
        Level::Debug,
        Level::Silly,
    ];

    /// Position in the severity order; `0` is the most severe.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Lowercase wire name of the level.
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Success => "success",
            Level::Http => "http",
            Level::Db => "db",
            Level::Verbose => "verbose",
            Level::Debug => "debug",
            Level::Silly => "silly",
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::Info
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "success" => Ok(Self::Success),
            "http" => Ok(Self::Http),
            "db" => Ok(Self::Db),
            "verbose" => Ok(Self::Verbose),
            "debug" => Ok(Self::Debug),
            "silly" | "trace" => Ok(Self::Silly),
            _ => Err(ParseLevelError(s.to_owned())),
        }
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.ordinal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("error", Level::Error)]
    #[case("WARNING", Level::Warn)]
    #[case("Db", Level::Db)]
    #[case("trace", Level::Silly)]
    fn parses_names_case_insensitively(#[case] input: &str, #[case] expected: Level) {
        assert_eq!(input.parse::<Level>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_names() {
        let err = "loud".parse::<Level>().expect_err("unknown level must fail");
        assert_eq!(err.to_string(), "unknown log level: loud");
    }

    #[rstest]
    fn ordinals_follow_severity_order() {
        let ordinals: Vec<u8> = Level::ALL.iter().map(|l| l.ordinal()).collect();
        assert_eq!(ordinals, (0..9).collect::<Vec<u8>>());
        assert!(Level::Db < Level::Verbose);
    }

    #[rstest]
    fn display_honours_padding() {
        assert_eq!(format!("{:<7}|", Level::Http), "http   |");
    }

    #[rstest]
    fn deserialises_lowercase_names() {
        let level: Level = serde_json::from_str("\"success\"").expect("valid level");
        assert_eq!(level, Level::Success);
    }
}
