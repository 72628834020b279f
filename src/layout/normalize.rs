//! Glyph run normalization.
//!
//! Turns raw runs (PDF user space, bottom-up) into [`TextItem`]s in top-down
//! page coordinates with typography inferred from the font resource name.

use super::color;
use crate::error::{Error, Result};
use crate::model::{Discovery, FontFamily, FontStyle, FontWeight, PageRecord, RawGlyphRun, Rgb};

/// A glyph run in canonical page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub text: String,
    /// Left edge, px
    pub x: i32,
    /// Baseline measured from the top of the page, px; never negative
    pub y: i32,
    pub font_size: u32,
    pub font_family: FontFamily,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub color: Rgb,
    /// Advance width, px
    pub width: f32,
}

impl TextItem {
    /// Right edge, px.
    pub fn right(&self) -> f32 {
        self.x as f32 + self.width
    }
}

/// Normalize every run on a page, in supplied order.
///
/// Colors come from the run itself when the supplier set one, otherwise from
/// the fill timeline at the run's operator index, otherwise from the page's
/// last fill color.
pub fn normalize_page(page: &PageRecord, discovery: &mut Discovery) -> Result<Vec<TextItem>> {
    let timeline = color::fill_timeline(&page.operators);
    let fallback = timeline.last().copied().unwrap_or(Rgb::BLACK);

    page.glyph_runs
        .iter()
        .map(|run| {
            let color = run
                .color
                .or_else(|| run.op_index.and_then(|i| color::color_at(&timeline, i)))
                .unwrap_or(fallback);
            let item = normalize_run(run, page.viewport_height, color).map_err(|message| {
                Error::Layout {
                    page: page.number,
                    message,
                }
            })?;
            discovery.record(item.color, item.font_family);
            Ok(item)
        })
        .collect()
}

/// Normalize one run against a viewport height.
pub fn normalize_run(
    run: &RawGlyphRun,
    viewport_height: f32,
    color: Rgb,
) -> std::result::Result<TextItem, String> {
    let t = &run.transform;
    if !t.is_finite() || !viewport_height.is_finite() {
        return Err(format!("non-finite transform for run {:?}", run.text));
    }

    Ok(TextItem {
        text: run.text.clone(),
        x: t.e.round() as i32,
        y: ((viewport_height - t.f).round() as i32).max(0),
        font_size: t.d.abs().round() as u32,
        font_family: font_family(&run.font_name),
        font_weight: font_weight(&run.font_name),
        font_style: font_style(&run.font_name),
        color,
        width: if run.width.is_finite() {
            run.width.max(0.0)
        } else {
            0.0
        },
    })
}

/// Family bucket from a font resource name.
pub fn font_family(font_name: &str) -> FontFamily {
    if font_name.contains("Arial") || font_name.contains("Helvetica") {
        FontFamily::SansSerif
    } else if font_name.contains("Calibri") {
        FontFamily::Calibri
    } else if font_name.contains("Verdana") {
        FontFamily::Verdana
    } else {
        FontFamily::Serif
    }
}

pub fn font_weight(font_name: &str) -> FontWeight {
    if font_name.contains("Bold") {
        FontWeight::Bold
    } else {
        FontWeight::Normal
    }
}

pub fn font_style(font_name: &str) -> FontStyle {
    if font_name.contains("Italic") || font_name.contains("Oblique") {
        FontStyle::Italic
    } else {
        FontStyle::Normal
    }
}
