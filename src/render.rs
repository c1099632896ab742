//! Raster rendering of draw instructions.
//!
//! [render] executes a [DrawInstruction] list on an RGBA canvas sized from a matplotlib-style
//! figure: a [RenderConfig::figure_width_in] by [RenderConfig::figure_height_in] inch page at
//! [RenderConfig::dpi], cropped to the union of the panel bounds plus a small margin.
//! Font sizes, marker areas and stroke widths are given in points and scaled by `dpi / 72`.
//!
//! Pitches follow the Opta coordinate system on a 105 × 68 metre pitch, drawn to scale and
//! centred in their panel. Across the pitch, `y = 100` is on the left.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use thiserror::Error;
use tracing::{debug, warn};

use crate::layout::{extent, Align, Bounds, Color, DrawInstruction, Orientation, Weight, MARKER_EDGE_WIDTH};

const POINTS_PER_INCH: f64 = 72.0;

const PITCH_LENGTH_M: f64 = 105.0;
const PITCH_WIDTH_M: f64 = 68.0;
const PITCH_PAD: f64 = 2.0;
const HALF_PITCH_PAD_BOTTOM: f64 = 0.5;

const PENALTY_AREA_X: f64 = 83.0;
const PENALTY_AREA_Y: (f64, f64) = (21.1, 78.9);
const SIX_YARD_BOX_X: f64 = 94.2;
const SIX_YARD_BOX_Y: (f64, f64) = (36.8, 63.2);
const PENALTY_SPOT_X: f64 = 88.5;
const GOAL_Y: (f64, f64) = (45.2, 54.8);
const GOAL_DEPTH: f64 = 1.8;
const CIRCLE_RADIUS_M: f64 = 9.15;
const SPOT_RADIUS_M: f64 = 0.25;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub dpi: f64,
    pub figure_width_in: f64,
    pub figure_height_in: f64,
    /// Margin around the cropped canvas.
    pub pad_in: f64,
    pub background: Color,
    pub pitch_line_color: Color,
    /// Pitch marking width in points.
    pub pitch_line_width: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dpi: 100.0,
            figure_width_in: 8.0,
            figure_height_in: 12.0,
            pad_in: 0.1,
            background: Color::BACKGROUND,
            pitch_line_color: Color::WHITE,
            pitch_line_width: 1.0,
        }
    }
}

impl RenderConfig {
    fn px_per_point(&self) -> f64 {
        self.dpi / POINTS_PER_INCH
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("nothing to render: no panels")]
    NoPanels,

    #[error("{0} instruction precedes any panel")]
    Unplaced(&'static str),

    #[error("failed to read font {path}: {source}")]
    FontRead { path: PathBuf, source: std::io::Error },

    #[error("{0} is not a usable font")]
    InvalidFont(PathBuf),

    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Typefaces for text instructions. Bold text falls back to the regular face when no bold
/// face is loaded.
pub struct Fonts {
    regular: FontVec,
    bold: Option<FontVec>,
}

impl Fonts {
    pub fn load(regular: impl AsRef<Path>, bold: Option<&Path>) -> Result<Self, RenderError> {
        Ok(Self {
            regular: read_font(regular.as_ref())?,
            bold: bold.map(read_font).transpose()?,
        })
    }

    fn face(&self, weight: Weight) -> &FontVec {
        match (weight, &self.bold) {
            (Weight::Bold, Some(bold)) => bold,
            _ => &self.regular,
        }
    }
}

fn read_font(path: &Path) -> Result<FontVec, RenderError> {
    let data = fs::read(path).map_err(|source| RenderError::FontRead {
        path: path.to_path_buf(),
        source,
    })?;
    FontVec::try_from_vec(data).map_err(|_| RenderError::InvalidFont(path.to_path_buf()))
}

/// Renders `instructions` and encodes the result as PNG.
pub fn render_png(instructions: &[DrawInstruction], config: &RenderConfig, fonts: Option<&Fonts>) -> Result<Vec<u8>, RenderError> {
    let canvas = render(instructions, config, fonts)?;
    let mut png = vec![];
    DynamicImage::ImageRgba8(canvas).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    debug!("encoded {} bytes of PNG", png.len());
    Ok(png)
}

/// Executes `instructions` in order on a fresh canvas. Text is skipped when `fonts` is `None`.
pub fn render(instructions: &[DrawInstruction], config: &RenderConfig, fonts: Option<&Fonts>) -> Result<RgbaImage, RenderError> {
    let extent = extent(instructions).ok_or(RenderError::NoPanels)?;
    let figure = Figure::new(extent, config);
    let (width, height) = figure.canvas_size(&extent);
    debug!("rendering {} instructions on a {width}x{height} canvas", instructions.len());
    let mut canvas = RgbaImage::from_pixel(width, height, rgba(config.background));

    if let Some(first) = instructions
        .first()
        .filter(|instruction| !matches!(instruction, DrawInstruction::Panel { .. }))
    {
        return Err(RenderError::Unplaced(first.kind()));
    }
    let mut frame = Frame::Panel(figure.place(&extent));
    let mut skipped_texts = 0;
    for instruction in instructions {
        if !execute(&mut canvas, &figure, &mut frame, instruction, config, fonts) {
            skipped_texts += 1;
        }
    }
    if skipped_texts > 0 {
        warn!("no font loaded: skipped {skipped_texts} text instructions");
    }
    Ok(canvas)
}

/// Draws one instruction in `frame`, or replaces `frame` if the instruction opens a new one.
/// Returns `false` if a text instruction was skipped for want of a font.
fn execute(
    canvas: &mut RgbaImage,
    figure: &Figure,
    frame: &mut Frame,
    instruction: &DrawInstruction,
    config: &RenderConfig,
    fonts: Option<&Fonts>,
) -> bool {
    let px_per_point = config.px_per_point();
    match instruction {
        DrawInstruction::Panel { bounds } => {
            *frame = Frame::Panel(figure.place(bounds));
        }
        DrawInstruction::PitchOutline { half, orientation } => {
            let pitch = Pitch::fit(frame.rect(), *half, *orientation);
            draw_pitch(canvas, &pitch, config);
            *frame = Frame::Pitch(pitch);
        }
        DrawInstruction::Marker {
            x,
            y,
            size,
            fill,
            edge,
            alpha,
        } => {
            let (cx, cy) = frame.to_px(*x, *y);
            let radius = size.max(0.0).sqrt() / 2.0 * px_per_point;
            let edge_half_width = MARKER_EDGE_WIDTH * px_per_point / 2.0;
            fill_annulus(canvas, cx, cy, 0.0, radius, *fill, *alpha);
            fill_annulus(
                canvas,
                cx,
                cy,
                (radius - edge_half_width).max(0.0),
                radius + edge_half_width,
                *edge,
                *alpha,
            );
        }
        DrawInstruction::Line { points, color, width } => {
            let points = points.iter().map(|&(x, y)| frame.to_px(x, y)).collect::<Vec<_>>();
            stroke(canvas, &points, *color, width * px_per_point);
        }
        DrawInstruction::Text {
            x,
            y,
            content,
            size,
            weight,
            color,
            align,
        } => {
            let Some(fonts) = fonts else {
                return false;
            };
            let (x, y) = frame.to_px(*x, *y);
            let scale = PxScale::from((size * px_per_point) as f32);
            draw_text(canvas, fonts.face(*weight), scale, x, y, content, *color, *align);
        }
    }
    true
}

/// A rectangle on the canvas, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Rect {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

struct Figure {
    origin_left: f64,
    origin_top: f64,
    width_px: f64,
    height_px: f64,
    pad_px: f64,
}

impl Figure {
    fn new(extent: Bounds, config: &RenderConfig) -> Self {
        Self {
            origin_left: extent.left,
            origin_top: extent.top(),
            width_px: config.figure_width_in * config.dpi,
            height_px: config.figure_height_in * config.dpi,
            pad_px: config.pad_in * config.dpi,
        }
    }

    fn canvas_size(&self, extent: &Bounds) -> (u32, u32) {
        let width = extent.width * self.width_px + 2.0 * self.pad_px;
        let height = extent.height * self.height_px + 2.0 * self.pad_px;
        (width.round().max(1.0) as u32, height.round().max(1.0) as u32)
    }

    fn place(&self, bounds: &Bounds) -> Rect {
        Rect {
            left: (bounds.left - self.origin_left) * self.width_px + self.pad_px,
            top: (self.origin_top - bounds.top()) * self.height_px + self.pad_px,
            width: bounds.width * self.width_px,
            height: bounds.height * self.height_px,
        }
    }
}

enum Frame {
    Panel(Rect),
    Pitch(Pitch),
}

impl Frame {
    fn rect(&self) -> Rect {
        match self {
            Frame::Panel(rect) => *rect,
            Frame::Pitch(pitch) => pitch.panel,
        }
    }

    fn to_px(&self, x: f64, y: f64) -> (f64, f64) {
        match self {
            Frame::Panel(rect) => (rect.left + x * rect.width, rect.top + (1.0 - y) * rect.height),
            Frame::Pitch(pitch) => pitch.to_px(x, y),
        }
    }
}

/// A pitch drawn to scale inside a panel.
struct Pitch {
    panel: Rect,
    half: bool,
    orientation: Orientation,
    left: f64,
    top: f64,
    px_per_m: f64,
    x_min: f64,
    x_max: f64,
    y_max: f64,
}

impl Pitch {
    fn fit(panel: Rect, half: bool, orientation: Orientation) -> Self {
        let x_min = if half { 50.0 - HALF_PITCH_PAD_BOTTOM } else { -PITCH_PAD };
        let x_max = 100.0 + PITCH_PAD;
        let (y_min, y_max) = (-PITCH_PAD, 100.0 + PITCH_PAD);
        let visible_across_m = (y_max - y_min) * PITCH_WIDTH_M / 100.0;
        let visible_along_m = (x_max - x_min) * PITCH_LENGTH_M / 100.0;
        let px_per_m = (panel.width / visible_across_m).min(panel.height / visible_along_m);
        Self {
            panel,
            half,
            orientation,
            left: panel.left + (panel.width - visible_across_m * px_per_m) / 2.0,
            top: panel.top + (panel.height - visible_along_m * px_per_m) / 2.0,
            px_per_m,
            x_min,
            x_max,
            y_max,
        }
    }

    fn to_px(&self, x: f64, y: f64) -> (f64, f64) {
        let across = (self.y_max - y) * PITCH_WIDTH_M / 100.0;
        let along = match self.orientation {
            Orientation::Vertical => self.x_max - x,
            Orientation::VerticalInverted => x - self.x_min,
        } * PITCH_LENGTH_M
            / 100.0;
        (self.left + across * self.px_per_m, self.top + along * self.px_per_m)
    }
}

/// Markings at the attacking end, as polylines in pitch units.
fn end_markings() -> Vec<Vec<(f64, f64)>> {
    let (penalty_low, penalty_high) = PENALTY_AREA_Y;
    let (six_low, six_high) = SIX_YARD_BOX_Y;
    let (goal_low, goal_high) = GOAL_Y;
    let mut markings = vec![
        vec![
            (100.0, penalty_low),
            (PENALTY_AREA_X, penalty_low),
            (PENALTY_AREA_X, penalty_high),
            (100.0, penalty_high),
        ],
        vec![
            (100.0, six_low),
            (SIX_YARD_BOX_X, six_low),
            (SIX_YARD_BOX_X, six_high),
            (100.0, six_high),
        ],
        vec![
            (100.0, goal_low),
            (100.0 + GOAL_DEPTH, goal_low),
            (100.0 + GOAL_DEPTH, goal_high),
            (100.0, goal_high),
        ],
    ];
    markings.extend(arc((PENALTY_SPOT_X, 50.0), CIRCLE_RADIUS_M, |x, _| x <= PENALTY_AREA_X));
    markings
}

fn draw_pitch(canvas: &mut RgbaImage, pitch: &Pitch, config: &RenderConfig) {
    let line_width = config.pitch_line_width * config.px_per_point();
    let color = config.pitch_line_color;
    let x_start = if pitch.half { 50.0 } else { 0.0 };

    let mut markings = vec![vec![
        (x_start, 0.0),
        (100.0, 0.0),
        (100.0, 100.0),
        (x_start, 100.0),
        (x_start, 0.0),
    ]];
    let mut spots = vec![(PENALTY_SPOT_X, 50.0)];
    markings.extend(end_markings());
    if pitch.half {
        markings.extend(arc((50.0, 50.0), CIRCLE_RADIUS_M, |x, _| x >= 50.0));
    } else {
        markings.push(vec![(50.0, 0.0), (50.0, 100.0)]);
        markings.extend(arc((50.0, 50.0), CIRCLE_RADIUS_M, |_, _| true));
        let defending_end = end_markings()
            .into_iter()
            .map(|marking| marking.into_iter().map(|(x, y)| (100.0 - x, y)).collect());
        markings.extend(defending_end);
        spots.push((100.0 - PENALTY_SPOT_X, 50.0));
        spots.push((50.0, 50.0));
    }

    for marking in markings {
        let points = marking.into_iter().map(|(x, y)| pitch.to_px(x, y)).collect::<Vec<_>>();
        stroke(canvas, &points, color, line_width);
    }
    let spot_radius = (SPOT_RADIUS_M * pitch.px_per_m).max(line_width);
    for (x, y) in spots {
        let (cx, cy) = pitch.to_px(x, y);
        fill_annulus(canvas, cx, cy, 0.0, spot_radius, color, 1.0);
    }
}

/// Samples a circle of `radius_m` about `centre`, split into runs of points that satisfy
/// `keep`.
fn arc(centre: (f64, f64), radius_m: f64, keep: impl Fn(f64, f64) -> bool) -> Vec<Vec<(f64, f64)>> {
    const STEPS: usize = 180;
    let mut runs = vec![];
    let mut run: Vec<(f64, f64)> = vec![];
    for step in 0..=STEPS {
        let theta = std::f64::consts::TAU * step as f64 / STEPS as f64;
        let x = centre.0 + radius_m * theta.cos() * 100.0 / PITCH_LENGTH_M;
        let y = centre.1 + radius_m * theta.sin() * 100.0 / PITCH_WIDTH_M;
        if keep(x, y) {
            run.push((x, y));
        } else if !run.is_empty() {
            runs.push(std::mem::take(&mut run));
        }
    }
    if !run.is_empty() {
        runs.push(run);
    }
    runs
}

fn rgba(color: Color) -> Rgba<u8> {
    Rgba([color.0, color.1, color.2, 255])
}

fn blend(canvas: &mut RgbaImage, x: i64, y: i64, color: Color, alpha: f64) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    let source = [color.0, color.1, color.2];
    for channel in 0..3 {
        let blended = source[channel] as f64 * alpha + pixel[channel] as f64 * (1.0 - alpha);
        pixel[channel] = blended.round().clamp(0.0, 255.0) as u8;
    }
}

/// Blends every pixel whose centre lies between `inner` and `outer` of `(cx, cy)`.
fn fill_annulus(canvas: &mut RgbaImage, cx: f64, cy: f64, inner: f64, outer: f64, color: Color, alpha: f64) {
    if outer <= 0.0 {
        return;
    }
    let (x_from, x_to) = ((cx - outer).floor() as i64, (cx + outer).ceil() as i64);
    let (y_from, y_to) = ((cy - outer).floor() as i64, (cy + outer).ceil() as i64);
    for y in y_from..=y_to {
        for x in x_from..=x_to {
            let distance = (x as f64 + 0.5 - cx).hypot(y as f64 + 0.5 - cy);
            if distance >= inner && distance <= outer {
                blend(canvas, x, y, color, alpha);
            }
        }
    }
}

/// Strokes an opaque polyline `width` pixels wide with round joins.
fn stroke(canvas: &mut RgbaImage, points: &[(f64, f64)], color: Color, width: f64) {
    let radius = (width / 2.0).max(0.5);
    let limits = (
        -radius,
        -radius,
        canvas.width() as f64 + radius,
        canvas.height() as f64 + radius,
    );
    for segment in points.windows(2) {
        let Some(((x0, y0), (x1, y1))) = clip_segment(segment[0], segment[1], limits) else {
            continue;
        };
        let length = (x1 - x0).hypot(y1 - y0);
        let steps = (length * 2.0).ceil().max(1.0) as usize;
        for step in 0..=steps {
            let t = step as f64 / steps as f64;
            fill_annulus(canvas, x0 + (x1 - x0) * t, y0 + (y1 - y0) * t, 0.0, radius, color, 1.0);
        }
    }
}

/// Clips the segment `a`-`b` to the rectangle `(left, top, right, bottom)`, returning `None` if
/// no part of it lies inside.
fn clip_segment(a: (f64, f64), b: (f64, f64), (left, top, right, bottom): (f64, f64, f64, f64)) -> Option<((f64, f64), (f64, f64))> {
    if ![a.0, a.1, b.0, b.1].iter().all(|coordinate| coordinate.is_finite()) {
        return None;
    }
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [(-dx, a.0 - left), (dx, right - a.0), (-dy, a.1 - top), (dy, bottom - a.1)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let t = q / p;
            if p < 0.0 {
                t0 = t0.max(t);
            } else {
                t1 = t1.min(t);
            }
        }
    }
    if t0 > t1 {
        return None;
    }
    Some(((a.0 + dx * t0, a.1 + dy * t0), (a.0 + dx * t1, a.1 + dy * t1)))
}

/// Draws `content` with the baseline of its last line at `y`; earlier lines stack upwards.
fn draw_text(canvas: &mut RgbaImage, font: &FontVec, scale: PxScale, x: f64, y: f64, content: &str, color: Color, align: Align) {
    let scaled = font.as_scaled(scale);
    let ascent = scaled.ascent() as f64;
    let line_height = (scaled.height() + scaled.line_gap()) as f64;
    let lines = content.lines().collect::<Vec<_>>();
    for (index, line) in lines.iter().enumerate() {
        let (width, _) = text_size(scale, font, line);
        let baseline = y - (lines.len() - 1 - index) as f64 * line_height;
        let left = match align {
            Align::Left => x,
            Align::Centre => x - width as f64 / 2.0,
            Align::Right => x - width as f64,
        };
        draw_text_mut(
            canvas,
            rgba(color),
            left.round() as i32,
            (baseline - ascent).round() as i32,
            scale,
            font,
            line,
        );
    }
}

#[cfg(test)]
mod tests;
