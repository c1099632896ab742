//! Testing helpers.

use assert_float_eq::*;

use crate::shot::{ShotEvent, ShotResult};
use crate::stats;
use crate::stats::Derivation;

pub const TEST_PLAYER: &str = "Harry Kane";
pub const TEST_SEASON: &str = "2023";

pub fn shot_event(x: f64, y: f64, xg: f64, result: ShotResult) -> ShotEvent {
    ShotEvent {
        player: TEST_PLAYER.into(),
        season: TEST_SEASON.into(),
        x,
        y,
        xg,
        result,
    }
}

/// A small, varied season: two goals among five shots.
pub fn sample_derivation() -> Derivation {
    stats::derive(&[
        shot_event(0.885, 0.5, 0.45, ShotResult::Goal),
        shot_event(0.7, 0.4, 0.05, ShotResult::MissedShot),
        shot_event(0.92, 0.55, 0.3, ShotResult::SavedShot),
        shot_event(0.95, 0.48, 0.6, ShotResult::Goal),
        shot_event(0.81, 0.62, 0.08, ShotResult::BlockedShot),
    ])
}

pub fn assert_slice_f64_near(expected: &[f64], actual: &[f64], distance: u32) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (index, &expected) in expected.iter().enumerate() {
        let actual = actual[index];
        if actual != expected {
            assert_f64_near!(expected, actual, distance);
        }
    }
}
