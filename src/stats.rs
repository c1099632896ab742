//! Derivation of pitch-scaled shots and season summary statistics from raw shot events.

use crate::shot::{DerivedShot, ShotEvent};

/// Multiplier taking normalised coordinates to pitch-length units.
pub const PITCH_SCALE: f64 = 100.0;

/// Pitch length, in yards, used by the shot distance conversion.
pub const PITCH_LENGTH_YARDS: f64 = 120.0;

/// Multiplier taking pitch-length units to yards on a [PITCH_LENGTH_YARDS] pitch.
pub const YARDS_PER_UNIT: f64 = PITCH_LENGTH_YARDS / PITCH_SCALE;

pub const METRES_PER_YARD: f64 = 0.9144;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryStats {
    pub total_shots: usize,
    pub total_goals: usize,
    pub total_xg: f64,
    /// Zero when there are no shots.
    pub xg_per_shot: f64,
    /// Mean of the rescaled `x` coordinates; zero when there are no shots.
    pub mean_x_coordinate: f64,
    /// Mean distance from the opposition goal line, in metres; zero when there are no shots.
    pub average_shot_distance_m: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Derivation {
    pub shots: Vec<DerivedShot>,
    pub stats: SummaryStats,
}

/// Rescales every shot to pitch-length units and computes the summary statistics.
pub fn derive(events: &[ShotEvent]) -> Derivation {
    let shots = events.iter().map(rescale).collect::<Vec<_>>();
    let stats = summarise(&shots);
    Derivation { shots, stats }
}

pub fn rescale(event: &ShotEvent) -> DerivedShot {
    DerivedShot {
        player: event.player.clone(),
        season: event.season.clone(),
        x: event.x * PITCH_SCALE,
        y: event.y * PITCH_SCALE,
        xg: event.xg,
        result: event.result.clone(),
    }
}

pub fn summarise(shots: &[DerivedShot]) -> SummaryStats {
    let total_shots = shots.len();
    if total_shots == 0 {
        return SummaryStats::default();
    }
    let total_goals = shots.iter().filter(|shot| shot.result.is_goal()).count();
    let total_xg = shots.iter().map(|shot| shot.xg).sum::<f64>();
    let xg_per_shot = total_xg / total_shots as f64;
    let mean_x_coordinate = mean(shots.iter().map(|shot| shot.x), total_shots);

    // each x is taken to yards before averaging
    let mean_x_yards = mean(shots.iter().map(|shot| shot.x * YARDS_PER_UNIT), total_shots);
    let average_shot_distance_m = (PITCH_LENGTH_YARDS - mean_x_yards) * METRES_PER_YARD;

    SummaryStats {
        total_shots,
        total_goals,
        total_xg,
        xg_per_shot,
        mean_x_coordinate,
        average_shot_distance_m,
    }
}

fn mean(values: impl Iterator<Item = f64>, count: usize) -> f64 {
    values.sum::<f64>() / count as f64
}
