use std::io::Write;

use super::*;
use crate::layout::{comparison, layout, Subject, Variant};
use crate::testing::{sample_derivation, TEST_PLAYER, TEST_SEASON};

fn single() -> Vec<DrawInstruction> {
    let derivation = sample_derivation();
    layout(
        TEST_PLAYER,
        TEST_SEASON,
        &derivation.shots,
        &derivation.stats,
        Variant::Single,
    )
}

#[test]
fn png_of_single_map() {
    let png = render_png(&single(), &RenderConfig::default(), None).unwrap();
    let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap();
    assert_eq!((820, 860), (decoded.width(), decoded.height()));
}

#[test]
fn png_of_comparison() {
    let derivation = sample_derivation();
    let subject = Subject {
        player_label: TEST_PLAYER,
        season_label: TEST_SEASON,
        derivation: &derivation,
    };
    let png = render_png(&comparison(&subject, &subject), &RenderConfig::default(), None).unwrap();
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((820, 1520), (decoded.width(), decoded.height()));
}

#[test]
fn background_and_goal_legend() {
    let canvas = render(&single(), &RenderConfig::default(), None).unwrap();
    assert_eq!(&Rgba([0x0C, 0x0D, 0x0E, 255]), canvas.get_pixel(0, 0));

    // red at 70% over the background
    let goal = canvas.get_pixel(386, 178);
    assert_eq!([182, 4, 4], [goal[0], goal[1], goal[2]]);
}

#[test]
fn pitch_markings_drawn() {
    let canvas = render(&single(), &RenderConfig::default(), None).unwrap();
    let goal_line = (228..=233).any(|y| canvas.get_pixel(410, y) == &Rgba([255, 255, 255, 255]));
    assert!(goal_line);
}

#[test]
fn inverted_pitch_puts_goal_at_bottom() {
    let panel = Rect {
        left: 0.0,
        top: 0.0,
        width: 720.0,
        height: 600.0,
    };
    let upright = Pitch::fit(panel, true, Orientation::Vertical);
    let inverted = Pitch::fit(panel, true, Orientation::VerticalInverted);
    assert!(upright.to_px(100.0, 50.0).1 < upright.to_px(50.0, 50.0).1);
    assert!(inverted.to_px(100.0, 50.0).1 > inverted.to_px(50.0, 50.0).1);
    assert_eq!(upright.to_px(100.0, 30.0).0, inverted.to_px(100.0, 30.0).0);

    // y = 100 is on the left
    assert!(upright.to_px(75.0, 100.0).0 < upright.to_px(75.0, 0.0).0);
}

#[test]
fn pitch_drawn_to_scale() {
    let panel = Rect {
        left: 0.0,
        top: 0.0,
        width: 720.0,
        height: 600.0,
    };
    let pitch = Pitch::fit(panel, true, Orientation::Vertical);
    let (left, _) = pitch.to_px(50.0, 100.0);
    let (right, _) = pitch.to_px(50.0, 0.0);
    let (_, top) = pitch.to_px(100.0, 0.0);
    let (_, bottom) = pitch.to_px(50.0, 0.0);
    let ratio = (bottom - top) / (right - left);
    assert!((ratio - 52.5 / 68.0).abs() < 1e-9, "ratio {ratio}");
}

#[test]
fn half_circle_arc() {
    let runs = arc((50.0, 50.0), CIRCLE_RADIUS_M, |x, _| x >= 50.0);
    assert_eq!(2, runs.len());
    assert!(runs.iter().flatten().all(|&(x, _)| x >= 50.0));
}

#[test]
fn nothing_to_render() {
    assert!(matches!(
        render(&[], &RenderConfig::default(), None),
        Err(RenderError::NoPanels)
    ));
}

#[test]
fn instruction_before_panel() {
    let mut instructions = single();
    instructions.insert(
        0,
        DrawInstruction::Line {
            points: vec![(0.0, 0.0), (1.0, 1.0)],
            color: Color::WHITE,
            width: 1.0,
        },
    );
    let err = render(&instructions, &RenderConfig::default(), None).unwrap_err();
    assert_eq!("Line instruction precedes any panel", err.to_string());
}

#[test]
fn missing_font() {
    let dir = tempfile::tempdir().unwrap();
    let result = Fonts::load(dir.path().join("Roboto-Regular.ttf"), None);
    assert!(matches!(result, Err(RenderError::FontRead { .. })));
}

#[test]
fn invalid_font() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"not a font").unwrap();
    let result = Fonts::load(file.path(), None);
    assert!(matches!(result, Err(RenderError::InvalidFont(_))));
}

#[test]
fn clip_segment_to_canvas() {
    let limits = (0.0, 0.0, 128.0, 64.0);
    assert_eq!(
        Some(((0.0, 32.0), (128.0, 32.0))),
        clip_segment((-64.0, 32.0), (192.0, 32.0), limits)
    );
    assert_eq!(
        Some(((10.0, 10.0), (20.0, 20.0))),
        clip_segment((10.0, 10.0), (20.0, 20.0), limits)
    );
    assert_eq!(None, clip_segment((10.0, 70.0), (90.0, 80.0), limits));
    assert_eq!(None, clip_segment((f64::NAN, 10.0), (20.0, 20.0), limits));
}

#[test]
fn stroke_far_beyond_canvas() {
    let mut canvas = RgbaImage::from_pixel(40, 20, Rgba([0, 0, 0, 255]));
    stroke(&mut canvas, &[(5.0, 10.0), (5e9, 10.0)], Color::WHITE, 2.0);
    assert_eq!(&Rgba([255, 255, 255, 255]), canvas.get_pixel(39, 10));
    assert_eq!(&Rgba([0, 0, 0, 255]), canvas.get_pixel(2, 10));
}
