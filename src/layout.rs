//! Deterministic shot map layout.
//!
//! [layout] turns a player's derived shots and summary statistics into an ordered list of
//! [DrawInstruction]s. The list is a complete description of the figure; a rendering surface
//! executes it in order without consulting anything else.
//!
//! Coordinates are expressed in frames. A [DrawInstruction::Panel] places a rectangle on the
//! figure, in figure-normalised coordinates (the figure spans `[0, 1]` on both axes, with
//! the origin at the bottom left; panels may extend beyond it), and subsequent instructions
//! are positioned in the panel's local `[0, 1]` frame. A [DrawInstruction::PitchOutline]
//! switches the current panel to pitch coordinates instead: `x` along the pitch length and
//! `y` across its width, both `0..100`, matching [DerivedShot].

use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::shot::DerivedShot;
use crate::stats::{Derivation, SummaryStats};

/// Width of the edge stroke drawn around every marker, in points.
pub const MARKER_EDGE_WIDTH: f64 = 0.8;

/// Opacity of shot markers and of the goal legend marker.
pub const SHOT_ALPHA: f64 = 0.7;

/// Marker area, in square points, per unit of xG.
pub const SHOT_SIZE_PER_XG: f64 = 300.0;

const LEGEND_SIZE_STEP: f64 = 100.0;
const LEGEND_MARKERS_X: [f64; 5] = [0.37, 0.42, 0.48, 0.54, 0.6];
const LEGEND_MARKERS_Y: f64 = 0.53;

/// Position across the pitch of the average shot distance gauge.
const DISTANCE_GAUGE_Y: f64 = 90.0;
const DISTANCE_LABEL_OFFSET: f64 = 4.0;
const GOAL_LINE_X: f64 = 100.0;

const STAT_LABELS_X: [f64; 4] = [0.15, 0.35, 0.56, 0.7];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const BACKGROUND: Color = Color(0x0C, 0x0D, 0x0E);
    pub const WHITE: Color = Color(0xFF, 0xFF, 0xFF);
    pub const RED: Color = Color(0xFF, 0x00, 0x00);
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// A rectangle in figure-normalised coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub left: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub const fn new(left: f64, bottom: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            bottom,
            width,
            height,
        }
    }

    pub fn top(&self) -> f64 {
        self.bottom + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// The smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Bounds) -> Bounds {
        let left = self.left.min(other.left);
        let bottom = self.bottom.min(other.bottom);
        Bounds {
            left,
            bottom,
            width: self.right().max(other.right()) - left,
            height: self.top().max(other.top()) - bottom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Weight {
    Normal,
    Bold,
}

/// Horizontal alignment of text relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Align {
    Left,
    Centre,
    Right,
}

/// Orientation of a half pitch. [Orientation::Vertical] puts the goal at the top of the
/// panel; [Orientation::VerticalInverted] mirrors it so that the goal is at the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Orientation {
    Vertical,
    VerticalInverted,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum DrawInstruction {
    Panel {
        bounds: Bounds,
    },
    Text {
        x: f64,
        y: f64,
        content: String,
        /// Font size in points.
        size: f64,
        weight: Weight,
        color: Color,
        align: Align,
    },
    Marker {
        x: f64,
        y: f64,
        /// Marker area in square points.
        size: f64,
        fill: Color,
        edge: Color,
        alpha: f64,
    },
    Line {
        points: Vec<(f64, f64)>,
        color: Color,
        /// Stroke width in points.
        width: f64,
    },
    PitchOutline {
        half: bool,
        orientation: Orientation,
    },
}

impl DrawInstruction {
    pub fn kind(&self) -> &'static str {
        match self {
            DrawInstruction::Panel { .. } => "Panel",
            DrawInstruction::Text { .. } => "Text",
            DrawInstruction::Marker { .. } => "Marker",
            DrawInstruction::Line { .. } => "Line",
            DrawInstruction::PitchOutline { .. } => "PitchOutline",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Single,
    ComparisonTop,
    ComparisonBottom,
}

/// Fixed placements for one player's block of the figure.
struct Geometry {
    header: Bounds,
    name_y: f64,
    caption_y: f64,
    outcome_label_y: f64,
    outcome_marker_y: f64,
    pitch: Bounds,
    orientation: Orientation,
    stats: Bounds,
    stat_label_y: f64,
    stat_value_y: f64,
    stat_values_x: [f64; 4],
}

const SINGLE: Geometry = Geometry {
    header: Bounds::new(0.0, 0.7, 1.0, 0.2),
    name_y: 0.9,
    caption_y: 0.75,
    outcome_label_y: 0.27,
    outcome_marker_y: 0.3,
    pitch: Bounds::new(0.05, 0.25, 0.9, 0.5),
    orientation: Orientation::Vertical,
    stats: Bounds::new(0.0, 0.2, 1.0, 0.05),
    stat_label_y: 0.5,
    stat_value_y: 0.0,
    stat_values_x: [0.185, 0.385, 0.555, 0.74],
};

const COMPARISON_TOP: Geometry = Geometry {
    stat_label_y: 4.0,
    stat_value_y: 3.5,
    stat_values_x: [0.18, 0.38, 0.55, 0.73],
    ..SINGLE
};

const COMPARISON_BOTTOM: Geometry = Geometry {
    header: Bounds::new(0.0, -0.35, 1.0, 0.2),
    name_y: 0.1,
    caption_y: 0.25,
    outcome_label_y: 0.7,
    outcome_marker_y: 0.73,
    pitch: Bounds::new(0.05, -0.2, 0.9, 0.5),
    orientation: Orientation::VerticalInverted,
    stats: Bounds::new(0.0, 0.0, 1.0, 0.05),
    stat_label_y: 3.0,
    stat_value_y: 2.5,
    ..COMPARISON_TOP
};

impl Variant {
    fn geometry(&self) -> &'static Geometry {
        match self {
            Variant::Single => &SINGLE,
            Variant::ComparisonTop => &COMPARISON_TOP,
            Variant::ComparisonBottom => &COMPARISON_BOTTOM,
        }
    }
}

/// One player's input to a comparison.
#[derive(Debug, Clone, Copy)]
pub struct Subject<'a> {
    pub player_label: &'a str,
    pub season_label: &'a str,
    pub derivation: &'a Derivation,
}

/// Lays out one player's block: header with legends, shots on a half pitch, and the
/// statistics strip.
pub fn layout(
    player_label: &str,
    season_label: &str,
    shots: &[DerivedShot],
    stats: &SummaryStats,
    variant: Variant,
) -> Vec<DrawInstruction> {
    let geometry = variant.geometry();
    let mut instructions = Vec::with_capacity(32 + shots.len());
    lay_header(player_label, season_label, geometry, &mut instructions);
    lay_pitch(shots, stats, geometry, &mut instructions);
    lay_stats(stats, geometry, &mut instructions);
    instructions
}

/// Lays out two players facing each other: `top` above, `bottom` below on a mirrored pitch.
pub fn comparison(top: &Subject, bottom: &Subject) -> Vec<DrawInstruction> {
    let mut instructions = layout(
        top.player_label,
        top.season_label,
        &top.derivation.shots,
        &top.derivation.stats,
        Variant::ComparisonTop,
    );
    instructions.extend(layout(
        bottom.player_label,
        bottom.season_label,
        &bottom.derivation.shots,
        &bottom.derivation.stats,
        Variant::ComparisonBottom,
    ));
    instructions
}

/// The union of every panel's bounds, or `None` if there are no panels.
pub fn extent(instructions: &[DrawInstruction]) -> Option<Bounds> {
    instructions
        .iter()
        .filter_map(|instruction| match instruction {
            DrawInstruction::Panel { bounds } => Some(*bounds),
            _ => None,
        })
        .reduce(|a, b| a.union(&b))
}

fn text(x: f64, y: f64, content: impl Into<String>, size: f64, weight: Weight, color: Color, align: Align) -> DrawInstruction {
    DrawInstruction::Text {
        x,
        y,
        content: content.into(),
        size,
        weight,
        color,
        align,
    }
}

fn marker(x: f64, y: f64, size: f64, fill: Color, alpha: f64) -> DrawInstruction {
    DrawInstruction::Marker {
        x,
        y,
        size,
        fill,
        edge: Color::WHITE,
        alpha,
    }
}

fn lay_header(player_label: &str, season_label: &str, geometry: &Geometry, instructions: &mut Vec<DrawInstruction>) {
    use Align::*;
    use Weight::*;

    instructions.push(DrawInstruction::Panel {
        bounds: geometry.header,
    });
    instructions.push(text(0.5, geometry.name_y, player_label, 20.0, Bold, Color::WHITE, Centre));
    instructions.push(text(
        0.5,
        geometry.caption_y,
        format!("All shots in League {season_label}"),
        14.0,
        Bold,
        Color::WHITE,
        Centre,
    ));

    // chance quality scale
    instructions.push(text(0.2, 0.5, "Low Quality Chance", 12.0, Bold, Color::WHITE, Centre));
    for (step, x) in LEGEND_MARKERS_X.into_iter().enumerate() {
        let size = (step + 1) as f64 * LEGEND_SIZE_STEP;
        instructions.push(marker(x, LEGEND_MARKERS_Y, size, Color::BACKGROUND, 1.0));
    }
    instructions.push(text(0.8, 0.5, "High Quality Chance", 12.0, Bold, Color::WHITE, Centre));

    // outcome key
    instructions.push(text(0.45, geometry.outcome_label_y, "Goal", 10.0, Normal, Color::WHITE, Right));
    instructions.push(marker(0.47, geometry.outcome_marker_y, LEGEND_SIZE_STEP, Color::RED, SHOT_ALPHA));
    instructions.push(marker(0.53, geometry.outcome_marker_y, LEGEND_SIZE_STEP, Color::BACKGROUND, 1.0));
    instructions.push(text(0.55, geometry.outcome_label_y, "No Goal", 10.0, Normal, Color::WHITE, Left));
}

fn lay_pitch(shots: &[DerivedShot], stats: &SummaryStats, geometry: &Geometry, instructions: &mut Vec<DrawInstruction>) {
    instructions.push(DrawInstruction::Panel {
        bounds: geometry.pitch,
    });
    instructions.push(DrawInstruction::PitchOutline {
        half: true,
        orientation: geometry.orientation,
    });

    // without shots there is no average distance to gauge
    if stats.total_shots > 0 {
        let mean_x = stats.mean_x_coordinate;
        instructions.push(DrawInstruction::Marker {
            x: mean_x,
            y: DISTANCE_GAUGE_Y,
            size: LEGEND_SIZE_STEP,
            fill: Color::WHITE,
            edge: Color::WHITE,
            alpha: 1.0,
        });
        instructions.push(DrawInstruction::Line {
            points: vec![(GOAL_LINE_X, DISTANCE_GAUGE_Y), (mean_x, DISTANCE_GAUGE_Y)],
            color: Color::WHITE,
            width: 2.0,
        });
        instructions.push(text(
            mean_x - DISTANCE_LABEL_OFFSET,
            DISTANCE_GAUGE_Y,
            format!("Average Distance\n{:.1} M", stats.average_shot_distance_m),
            10.0,
            Weight::Normal,
            Color::WHITE,
            Align::Centre,
        ));
    }

    for shot in shots {
        let fill = if shot.result.is_goal() {
            Color::RED
        } else {
            Color::BACKGROUND
        };
        instructions.push(marker(shot.x, shot.y, SHOT_SIZE_PER_XG * shot.xg, fill, SHOT_ALPHA));
    }
}

fn lay_stats(stats: &SummaryStats, geometry: &Geometry, instructions: &mut Vec<DrawInstruction>) {
    instructions.push(DrawInstruction::Panel {
        bounds: geometry.stats,
    });
    let readouts = [
        ("Shots", stats.total_shots.to_string()),
        ("Goals", stats.total_goals.to_string()),
        ("xG", format!("{:.2}", stats.total_xg)),
        ("xG/Shot", format!("{:.2}", stats.xg_per_shot)),
    ];
    for (slot, (label, value)) in readouts.into_iter().enumerate() {
        instructions.push(text(
            STAT_LABELS_X[slot],
            geometry.stat_label_y,
            label,
            20.0,
            Weight::Bold,
            Color::WHITE,
            Align::Left,
        ));
        instructions.push(text(
            geometry.stat_values_x[slot],
            geometry.stat_value_y,
            value,
            16.0,
            Weight::Normal,
            Color::RED,
            Align::Left,
        ));
    }
}

#[cfg(test)]
mod tests;
