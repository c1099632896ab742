use super::*;
use crate::shot::ShotResult;
use crate::stats;
use crate::testing::{sample_derivation, shot_event, TEST_PLAYER, TEST_SEASON};

const HEADER_INSTRUCTIONS: usize = 14;
const PITCH_INSTRUCTIONS: usize = 5;
const STATS_INSTRUCTIONS: usize = 9;

fn single(derivation: &Derivation) -> Vec<DrawInstruction> {
    layout(
        TEST_PLAYER,
        TEST_SEASON,
        &derivation.shots,
        &derivation.stats,
        Variant::Single,
    )
}

fn texts(instructions: &[DrawInstruction]) -> Vec<&str> {
    instructions
        .iter()
        .filter_map(|instruction| match instruction {
            DrawInstruction::Text { content, .. } => Some(content.as_str()),
            _ => None,
        })
        .collect()
}

fn panels(instructions: &[DrawInstruction]) -> Vec<Bounds> {
    instructions
        .iter()
        .filter_map(|instruction| match instruction {
            DrawInstruction::Panel { bounds } => Some(*bounds),
            _ => None,
        })
        .collect()
}

#[test]
fn single_instruction_count() {
    let derivation = sample_derivation();
    let instructions = single(&derivation);
    assert_eq!(
        HEADER_INSTRUCTIONS + PITCH_INSTRUCTIONS + derivation.shots.len() + STATS_INSTRUCTIONS,
        instructions.len()
    );
}

#[test]
fn single_panels() {
    let instructions = single(&sample_derivation());
    assert_eq!(
        vec![
            Bounds::new(0.0, 0.7, 1.0, 0.2),
            Bounds::new(0.05, 0.25, 0.9, 0.5),
            Bounds::new(0.0, 0.2, 1.0, 0.05),
        ],
        panels(&instructions)
    );
    assert_eq!(
        DrawInstruction::PitchOutline {
            half: true,
            orientation: Orientation::Vertical,
        },
        instructions[HEADER_INSTRUCTIONS + 1]
    );
}

#[test]
fn single_texts() {
    let derivation = sample_derivation();
    let instructions = single(&derivation);
    assert_eq!(
        vec![
            "Harry Kane",
            "All shots in League 2023",
            "Low Quality Chance",
            "High Quality Chance",
            "Goal",
            "No Goal",
            "Average Distance\n16.1 M",
            "Shots",
            "5",
            "Goals",
            "2",
            "xG",
            "1.48",
            "xG/Shot",
            "0.30",
        ],
        texts(&instructions)
    );
}

#[test]
fn quality_legend_sizes() {
    let instructions = single(&sample_derivation());
    let sizes = instructions[..HEADER_INSTRUCTIONS]
        .iter()
        .filter_map(|instruction| match instruction {
            DrawInstruction::Marker { size, fill: Color::BACKGROUND, y, .. } if *y == 0.53 => Some(*size),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(vec![100.0, 200.0, 300.0, 400.0, 500.0], sizes);
}

#[test]
fn shot_markers() {
    let derivation = stats::derive(&[
        shot_event(0.9, 0.5, 0.5, ShotResult::Goal),
        shot_event(0.8, 0.3, 0.1, ShotResult::SavedShot),
    ]);
    let instructions = single(&derivation);
    let shots = &instructions[HEADER_INSTRUCTIONS + PITCH_INSTRUCTIONS..][..2];
    assert_eq!(
        DrawInstruction::Marker {
            x: 90.0,
            y: 50.0,
            size: 150.0,
            fill: Color::RED,
            edge: Color::WHITE,
            alpha: 0.7,
        },
        shots[0]
    );
    assert_eq!(
        DrawInstruction::Marker {
            x: 80.0,
            y: 30.0,
            size: 300.0 * 0.1,
            fill: Color::BACKGROUND,
            edge: Color::WHITE,
            alpha: 0.7,
        },
        shots[1]
    );
}

#[test]
fn average_distance_gauge() {
    let derivation = sample_derivation();
    let mean_x = derivation.stats.mean_x_coordinate;
    let instructions = single(&derivation);
    let gauge = &instructions[HEADER_INSTRUCTIONS + 2..HEADER_INSTRUCTIONS + PITCH_INSTRUCTIONS];
    assert!(matches!(gauge[0], DrawInstruction::Marker { x, y, fill: Color::WHITE, .. } if x == mean_x && y == 90.0));
    assert_eq!(
        DrawInstruction::Line {
            points: vec![(100.0, 90.0), (mean_x, 90.0)],
            color: Color::WHITE,
            width: 2.0,
        },
        gauge[1]
    );
    assert!(matches!(gauge[2], DrawInstruction::Text { x, y, align: Align::Centre, .. } if x == mean_x - 4.0 && y == 90.0));
}

#[test]
fn no_shots() {
    let derivation = stats::derive(&[]);
    let instructions = single(&derivation);
    assert_eq!(
        HEADER_INSTRUCTIONS + PITCH_INSTRUCTIONS - 3 + STATS_INSTRUCTIONS,
        instructions.len()
    );
    let texts = texts(&instructions);
    assert!(!texts.iter().any(|text| text.starts_with("Average Distance")));
    assert_eq!(["0", "0", "0.00", "0.00"], [texts[7], texts[9], texts[11], texts[13]]);
}

#[test]
fn deterministic() {
    let derivation = sample_derivation();
    let first = serde_json::to_vec(&single(&derivation)).unwrap();
    let second = serde_json::to_vec(&single(&derivation)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn serialised_form() {
    let instruction = DrawInstruction::Marker {
        x: 0.47,
        y: 0.3,
        size: 100.0,
        fill: Color::RED,
        edge: Color::WHITE,
        alpha: 0.7,
    };
    assert_eq!(
        r##"{"kind":"Marker","x":0.47,"y":0.3,"size":100.0,"fill":"#FF0000","edge":"#FFFFFF","alpha":0.7}"##,
        serde_json::to_string(&instruction).unwrap()
    );
}

#[test]
fn comparison_blocks_mirror() {
    let top = sample_derivation();
    let bottom = stats::derive(&vec![shot_event(0.9, 0.5, 0.5, ShotResult::Goal); 5]);
    let instructions = comparison(
        &Subject {
            player_label: "Player A",
            season_label: "2022",
            derivation: &top,
        },
        &Subject {
            player_label: "Player B",
            season_label: "2023",
            derivation: &bottom,
        },
    );
    let block_len = instructions.len() / 2;
    let (upper, lower) = instructions.split_at(block_len);
    assert_eq!(upper.len(), lower.len());
    for (a, b) in upper.iter().zip(lower) {
        assert_eq!(a.kind(), b.kind());
        if let DrawInstruction::PitchOutline { half, orientation } = b {
            assert!(*half);
            assert_eq!(Orientation::VerticalInverted, *orientation);
        }
        if let DrawInstruction::PitchOutline { orientation, .. } = a {
            assert_eq!(Orientation::Vertical, *orientation);
        }
    }
    assert_eq!(Some("Player A"), texts(upper).first().copied());
    assert_eq!(Some("Player B"), texts(lower).first().copied());
}

#[test]
fn comparison_panels() {
    let derivation = sample_derivation();
    let subject = Subject {
        player_label: TEST_PLAYER,
        season_label: TEST_SEASON,
        derivation: &derivation,
    };
    let instructions = comparison(&subject, &subject);
    assert_eq!(
        vec![
            Bounds::new(0.0, 0.7, 1.0, 0.2),
            Bounds::new(0.05, 0.25, 0.9, 0.5),
            Bounds::new(0.0, 0.2, 1.0, 0.05),
            Bounds::new(0.0, -0.35, 1.0, 0.2),
            Bounds::new(0.05, -0.2, 0.9, 0.5),
            Bounds::new(0.0, 0.0, 1.0, 0.05),
        ],
        panels(&instructions)
    );
    let extent = extent(&instructions).unwrap();
    assert_eq!(-0.35, extent.bottom);
    assert_eq!(0.0, extent.left);
    assert_eq!(1.0, extent.width);
    assert!((extent.top() - 0.9).abs() < 1e-12);
}

#[test]
fn comparison_stat_strips() {
    let derivation = sample_derivation();
    let top = layout(TEST_PLAYER, TEST_SEASON, &derivation.shots, &derivation.stats, Variant::ComparisonTop);
    let bottom = layout(TEST_PLAYER, TEST_SEASON, &derivation.shots, &derivation.stats, Variant::ComparisonBottom);
    let value_positions = |instructions: &[DrawInstruction]| {
        instructions
            .iter()
            .filter_map(|instruction| match instruction {
                DrawInstruction::Text { x, y, color: Color::RED, .. } => Some((*x, *y)),
                _ => None,
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(
        vec![(0.18, 3.5), (0.38, 3.5), (0.55, 3.5), (0.73, 3.5)],
        value_positions(&top)
    );
    assert_eq!(
        vec![(0.18, 2.5), (0.38, 2.5), (0.55, 2.5), (0.73, 2.5)],
        value_positions(&bottom)
    );
}

#[test]
fn comparison_bottom_header() {
    let derivation = sample_derivation();
    let caption = format!("All shots in League {TEST_SEASON}");
    for (variant, name_y, caption_y, outcome_label_y, outcome_marker_y) in [
        (Variant::ComparisonTop, 0.9, 0.75, 0.27, 0.3),
        (Variant::ComparisonBottom, 0.1, 0.25, 0.7, 0.73),
    ] {
        let instructions = layout(TEST_PLAYER, TEST_SEASON, &derivation.shots, &derivation.stats, variant);
        let header = &instructions[..HEADER_INSTRUCTIONS];
        let text_at = |content: &str| {
            header.iter().find_map(|instruction| match instruction {
                DrawInstruction::Text { content: actual, x, y, .. } if actual == content => Some((*x, *y)),
                _ => None,
            })
        };
        assert_eq!(Some((0.5, name_y)), text_at(TEST_PLAYER), "{variant:?}");
        assert_eq!(Some((0.5, caption_y)), text_at(&caption), "{variant:?}");
        assert_eq!(Some((0.45, outcome_label_y)), text_at("Goal"), "{variant:?}");
        assert_eq!(Some((0.55, outcome_label_y)), text_at("No Goal"), "{variant:?}");

        let outcome_markers = header
            .iter()
            .filter_map(|instruction| match instruction {
                DrawInstruction::Marker { x, y, fill, .. } if *y == outcome_marker_y => Some((*x, *fill)),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(
            vec![(0.47, Color::RED), (0.53, Color::BACKGROUND)],
            outcome_markers,
            "{variant:?}"
        );
    }
}

#[test]
fn extent_of_nothing() {
    assert_eq!(None, extent(&[]));
}
