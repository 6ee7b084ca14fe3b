//! Severity definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentinel name for a severity that does not map to any known level.
pub const UNKNOWN_LEVEL: &str = "unknown";

/// Log severity. `Perf` sits below `Debug` and marks records that carry a
/// snapshot of process performance counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Perf = 0,
    Debug = 1,
    #[default]
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl Level {
    pub const ALL: [Level; 5] = [Level::Perf, Level::Debug, Level::Info, Level::Warn, Level::Error];

    /// Lower-case canonical name, as used in configuration documents.
    pub fn name(&self) -> &'static str {
        match self {
            Level::Perf => "perf",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            Level::Perf => "PERF",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }

    /// Upper-case first letter of the name (`P`, `D`, `I`, `W`, `E`).
    pub fn single_letter(&self) -> &'static str {
        &self.to_str()[..1]
    }

    /// Render for output, optionally collapsed to a single letter.
    pub fn display_name(&self, single_letter: bool) -> &'static str {
        if single_letter {
            self.single_letter()
        } else {
            self.to_str()
        }
    }

    /// Lenient lookup: unknown names resolve to `Info`.
    pub fn from_name_or_default(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    pub fn from_repr(repr: u8) -> Option<Self> {
        Self::ALL.get(repr as usize).copied()
    }

    /// Name for a raw severity value, or [`UNKNOWN_LEVEL`].
    pub fn name_of_repr(repr: u8) -> &'static str {
        Self::from_repr(repr).map_or(UNKNOWN_LEVEL, |level| level.name())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "perf" => Ok(Level::Perf),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}
