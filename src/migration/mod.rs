pub mod parsing;

pub use parsing::{
    ParsedUnit, discover_units, parse_ordering_key, parse_unit_filename, resolve, select_units,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which entry point a run invokes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Apply pending units, oldest first
    Up,
    /// Revert applied units, newest first
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How many units a run may execute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepCount {
    Bounded(u64),
    Unbounded,
}

impl StepCount {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, StepCount::Bounded(0))
    }

    /// Count left after one successful step
    pub fn decrement(self) -> Self {
        match self {
            StepCount::Bounded(n) => StepCount::Bounded(n.saturating_sub(1)),
            StepCount::Unbounded => StepCount::Unbounded,
        }
    }
}

impl Default for StepCount {
    fn default() -> Self {
        StepCount::Bounded(1)
    }
}

impl fmt::Display for StepCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepCount::Bounded(n) => write!(f, "{}", n),
            StepCount::Unbounded => f.write_str("all"),
        }
    }
}

impl FromStr for StepCount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "inf" | "infinity" => Ok(StepCount::Unbounded),
            other => other
                .parse::<u64>()
                .map(StepCount::Bounded)
                .map_err(|_| format!("'{}' is not a step count (use a number or 'all')", s)),
        }
    }
}
