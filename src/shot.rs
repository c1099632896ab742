//! Shot events as supplied by the provider, and their pitch-scaled derivatives.

use std::fmt::{Display, Formatter};

use strum_macros::{EnumIter, EnumString};

/// Outcome of a shot. Only [ShotResult::Goal] is singled out when drawing; the remaining
/// outcomes are retained for tabulation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString, EnumIter)]
pub enum ShotResult {
    Goal,
    MissedShot,
    SavedShot,
    BlockedShot,
    ShotOnPost,
    OwnGoal,
    #[strum(default)]
    Other(String),
}

impl ShotResult {
    pub fn is_goal(&self) -> bool {
        matches!(self, ShotResult::Goal)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ShotResult::Goal => "Goal",
            ShotResult::MissedShot => "MissedShot",
            ShotResult::SavedShot => "SavedShot",
            ShotResult::BlockedShot => "BlockedShot",
            ShotResult::ShotOnPost => "ShotOnPost",
            ShotResult::OwnGoal => "OwnGoal",
            ShotResult::Other(other) => other,
        }
    }
}

impl Display for ShotResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single shot in normalised `[0, 1]` pitch coordinates. `x` runs from the shooter's own
/// goal line to the opposition's; `y` runs across the pitch.
#[derive(Debug, Clone, PartialEq)]
pub struct ShotEvent {
    pub player: String,
    pub season: String,
    pub x: f64,
    pub y: f64,
    pub xg: f64,
    pub result: ShotResult,
}

/// A [ShotEvent] with its coordinates rescaled to pitch-length units, where the pitch
/// measures 100 along either axis.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedShot {
    pub player: String,
    pub season: String,
    pub x: f64,
    pub y: f64,
    pub xg: f64,
    pub result: ShotResult,
}
