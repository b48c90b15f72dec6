//! Proficiency level controlling the difficulty of the tutoring prompt.

use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse proficiency tier. Stored as its text form (`"A1"`, `"A2"`, `"B1"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Level {
    A1,
    #[default]
    A2,
    B1,
}

impl Level {
    /// All recognized levels, lowest first.
    pub const ALL: [Level; 3] = [Level::A1, Level::A2, Level::B1];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::A1 => "A1",
            Level::A2 => "A2",
            Level::B1 => "B1",
        }
    }

    /// Maps a stored column value to a level; NULL or unrecognized text falls back to the default.
    pub(crate) fn from_stored(value: Option<&str>) -> Level {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = StorageError;

    /// Accepts `A1`, `A2`, `B1` (surrounding whitespace and letter case ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A1" => Ok(Level::A1),
            "A2" => Ok(Level::A2),
            "B1" => Ok(Level::B1),
            _ => Err(StorageError::InvalidLevel(s.to_string())),
        }
    }
}
