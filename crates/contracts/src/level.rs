//! Severity levels
//!
//! `Level::None` is the zero value. As a threshold it means "always deliver",
//! not "lowest severity".

use serde::{Serialize, Serializer};
use std::fmt;

/// Short display codes, indexed by level number
pub const LEVEL_CODES: [&str; 9] = [
    "", "FNST", "FINE", "DEBG", "TRAC", "INFO", "WARN", "EROR", "CRIT",
];

/// Long level names, indexed by level number
pub const LEVEL_NAMES: [&str; 9] = [
    "NONE", "FINEST", "FINE", "DEBUG", "TRACE", "INFO", "WARNING", "ERROR", "CRITICAL",
];

/// Record severity, totally ordered from `None` to `Critical`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Level {
    /// Unset; as a threshold it passes every record
    #[default]
    None = 0,
    Finest = 1,
    Fine = 2,
    Debug = 3,
    Trace = 4,
    Info = 5,
    Warning = 6,
    Error = 7,
    Critical = 8,
}

impl Level {
    /// Every level in ascending order
    pub const ALL: [Level; 9] = [
        Level::None,
        Level::Finest,
        Level::Fine,
        Level::Debug,
        Level::Trace,
        Level::Info,
        Level::Warning,
        Level::Error,
        Level::Critical,
    ];

    /// Look a level up by its long name.
    ///
    /// Matching is exact and case-sensitive; anything unknown maps to
    /// `Level::None`.
    pub fn from_name(name: &str) -> Level {
        LEVEL_NAMES
            .iter()
            .position(|candidate| *candidate == name)
            .map(|idx| Level::ALL[idx])
            .unwrap_or(Level::None)
    }

    /// Like [`Level::from_name`] but distinguishes "unknown" from `"NONE"`
    pub fn try_from_name(name: &str) -> Option<Level> {
        LEVEL_NAMES
            .iter()
            .position(|candidate| *candidate == name)
            .map(|idx| Level::ALL[idx])
    }

    /// Four character code (`INFO`, `WARN`, ...); empty for `None`
    pub fn code(self) -> &'static str {
        LEVEL_CODES[self as usize]
    }

    /// Long name (`INFO`, `WARNING`, ...)
    pub fn name(self) -> &'static str {
        LEVEL_NAMES[self as usize]
    }

    /// Numeric value used on the wire
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Threshold check with the `None` wildcard
    pub fn passes(self, threshold: Level) -> bool {
        threshold == Level::None || self >= threshold
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}
