//! Fill color replay.
//!
//! The operator list is folded into a timeline holding the fill color in
//! effect after every operator, so each glyph run can look up the color it was
//! painted with instead of inheriting whatever was set last on the page.
//!
//! CMYK uses the naive `255·(1-c)·(1-k)` conversion. It is a readable
//! approximation, not a colorimetric one.

use crate::model::{PaintOp, Rgb};

/// Fill color after each operator; `timeline[i]` is the color once op `i`
/// has run. The register starts out black.
pub fn fill_timeline(ops: &[PaintOp]) -> Vec<Rgb> {
    ops.iter()
        .scan(Rgb::BLACK, |current, op| {
            if let Some(color) = fill_of(op) {
                *current = color;
            }
            Some(*current)
        })
        .collect()
}

/// The last fill color set on the page, black if none was.
pub fn representative_fill(ops: &[PaintOp]) -> Rgb {
    ops.iter().rev().find_map(fill_of).unwrap_or(Rgb::BLACK)
}

/// Color in effect at `op_index`, if the index lies inside the timeline.
pub fn color_at(timeline: &[Rgb], op_index: usize) -> Option<Rgb> {
    timeline.get(op_index).copied()
}

/// Color set by a single operator, `None` for anything that is not a fill.
pub fn fill_of(op: &PaintOp) -> Option<Rgb> {
    match *op {
        PaintOp::SetFillRgb(r, g, b) => Some(rgb_to_rgb(r, g, b)),
        PaintOp::SetFillGray(g) => Some(gray_to_rgb(g)),
        PaintOp::SetFillCmyk(c, m, y, k) => Some(cmyk_to_rgb(c, m, y, k)),
        PaintOp::ShowText | PaintOp::Other(_) => None,
    }
}

pub fn rgb_to_rgb(r: f32, g: f32, b: f32) -> Rgb {
    Rgb::new(channel(r), channel(g), channel(b))
}

pub fn gray_to_rgb(g: f32) -> Rgb {
    let v = channel(g);
    Rgb::new(v, v, v)
}

pub fn cmyk_to_rgb(c: f32, m: f32, y: f32, k: f32) -> Rgb {
    let k = unit(k);
    Rgb::new(
        channel((1.0 - unit(c)) * (1.0 - k)),
        channel((1.0 - unit(m)) * (1.0 - k)),
        channel((1.0 - unit(y)) * (1.0 - k)),
    )
}

fn unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

fn channel(v: f32) -> u8 {
    (unit(v) * 255.0).round() as u8
}
