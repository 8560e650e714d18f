//! Severity filtering shared by the logger and every channel.
//!
//! The same check runs at two independent points: once globally before an
//! event is built, and once inside each channel against that channel's own
//! threshold.

use crate::level::Level;

/// Return `true` if `level` meets `minimum`.
///
/// A missing minimum allows every level.
pub fn passes(level: Level, minimum: Option<Level>) -> bool {
    minimum.is_none_or(|min| level.ordinal() <= min.ordinal())
}

/// Minimum-level gate held by the logger and by each channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LevelFilter {
    minimum: Option<Level>,
}

impl LevelFilter {
    pub fn new(minimum: Option<Level>) -> Self {
        Self { minimum }
    }

    /// Filter letting every level through.
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn minimum(&self) -> Option<Level> {
        self.minimum
    }

    pub fn should_log(&self, level: Level) -> bool {
        passes(level, self.minimum)
    }
}

impl From<Option<Level>> for LevelFilter {
    fn from(minimum: Option<Level>) -> Self {
        Self::new(minimum)
    }
}
