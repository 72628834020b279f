//! Page layout reconstruction.
//!
//! One page goes through four stages:
//!
//! 1. [`color`] folds the paint operators into a fill-color timeline
//! 2. [`normalize`] turns glyph runs into top-down [`TextItem`]s
//! 3. [`lines`] clusters items into baselines
//! 4. [`classify`] and [`emit`] assign roles and produce [`LayoutBlock`]s
//!
//! [`LayoutBlock`]: crate::model::LayoutBlock

pub mod classify;
pub mod color;
pub mod emit;
pub mod lines;
pub mod normalize;

pub use classify::{classify, LineMetrics};
pub use lines::{group_lines, Line};
pub use normalize::TextItem;

use crate::error::{Error, Result};
use crate::model::{Discovery, PageLayout, PageRecord};
use serde::{Deserialize, Serialize};

/// Thresholds used by the grouper, the classifier and the emitter.
///
/// Every field has a default; a partial JSON object only overrides the keys
/// it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Left page margin subtracted from the leftmost x
    pub base_margin_px: i32,
    /// Max y distance between items on one line
    pub line_tolerance_px: i32,
    /// Smallest horizontal gap that gets padded with spaces
    pub space_gap_px: f32,
    /// Width of one inserted space
    pub space_unit_px: f32,
    pub max_inserted_spaces: usize,

    /// Indent beyond which a line reads as a bullet
    pub bullet_indent_px: u32,
    /// Minimum character count for an indented bullet
    pub bullet_min_chars: usize,
    /// Word limit of an all-caps phrase that is never an indented bullet
    pub short_caps_max_words: usize,
    /// All-caps lines above this size are headers
    pub header_caps_size: u32,
    /// Bold lines above this size are headers
    pub header_bold_size: u32,
    /// Bold lines at or above this size are sub-headers
    pub sub_header_size: u32,

    /// Vertical gap that starts a new paragraph
    pub paragraph_break_px: i32,
    pub header_margin_px: u32,
    pub sub_header_margin_px: u32,
    pub list_margin_px: u32,
    pub paragraph_margin_px: u32,
    pub paragraph_break_margin_px: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_margin_px: 50,
            line_tolerance_px: 2,
            space_gap_px: 3.0,
            space_unit_px: 4.0,
            max_inserted_spaces: 15,
            bullet_indent_px: 15,
            bullet_min_chars: 3,
            short_caps_max_words: 4,
            header_caps_size: 14,
            header_bold_size: 16,
            sub_header_size: 12,
            paragraph_break_px: 20,
            header_margin_px: 20,
            sub_header_margin_px: 12,
            list_margin_px: 4,
            paragraph_margin_px: 0,
            paragraph_break_margin_px: 16,
        }
    }
}

impl LayoutConfig {
    /// Create a config with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the left base margin.
    pub fn with_base_margin(mut self, px: i32) -> Self {
        self.base_margin_px = px;
        self
    }

    /// Set the line grouping tolerance.
    pub fn with_line_tolerance(mut self, px: i32) -> Self {
        self.line_tolerance_px = px.max(0);
        self
    }

    /// Set the maximum number of spaces inserted for one gap.
    pub fn with_max_inserted_spaces(mut self, n: usize) -> Self {
        self.max_inserted_spaces = n;
        self
    }

    /// Read thresholds from JSON; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Other(format!("invalid layout config: {}", e)))
    }
}

/// Lay out one page: normalize, group, classify and emit.
///
/// Fails only when a glyph run cannot be normalized; the caller decides
/// whether that sends the whole document to the plain-text path.
pub fn layout_page(page: &PageRecord, config: &LayoutConfig) -> Result<PageLayout> {
    let mut discovery = Discovery::default();
    let items = normalize::normalize_page(page, &mut discovery)?;
    let item_count = items.len();

    let lines = group_lines(items, config.line_tolerance_px);
    let blocks = emit::emit_blocks(&lines, page.number, config);

    log::debug!(
        "Page {}: {} items, {} lines, {} blocks",
        page.number,
        item_count,
        lines.len(),
        blocks.len()
    );
    log::debug!(
        "Page {}: colors {:?}, fonts {:?}",
        page.number,
        discovery.colors,
        discovery.fonts
    );

    Ok(PageLayout {
        number: page.number,
        blocks,
        discovery,
    })
}
