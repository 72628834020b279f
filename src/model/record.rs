//! Raw per-page records handed to the layout pipeline.
//!
//! These mirror what a page decoder yields for each page: the viewport, the
//! ordered paint operators and the positioned glyph runs. The pipeline only
//! reads them.

use super::Rgb;
use serde::{Deserialize, Serialize};

/// A 2D affine matrix `[a b c d e f]` in PDF order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    pub const fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Pure translation.
    pub const fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// `self × other`, i.e. apply `self` first, then `other`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Length of the transformed x unit vector.
    pub fn horizontal_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    /// Whether every component is finite.
    pub fn is_finite(&self) -> bool {
        [self.a, self.b, self.c, self.d, self.e, self.f]
            .iter()
            .all(|v| v.is_finite())
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// One entry of a page's operator list, reduced to what layout needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PaintOp {
    /// Non-stroking DeviceRGB color, components in [0, 1]
    SetFillRgb(f32, f32, f32),
    /// Non-stroking DeviceGray color, in [0, 1]
    SetFillGray(f32),
    /// Non-stroking DeviceCMYK color, components in [0, 1]
    SetFillCmyk(f32, f32, f32, f32),
    /// A text-showing operator
    ShowText,
    /// Anything else, kept by name
    Other(String),
}

/// A contiguous run of characters drawn with one transform and font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawGlyphRun {
    /// Text rendering matrix; `d` carries the effective font size
    pub transform: Matrix,
    /// Decoded characters
    pub text: String,
    /// Font resource name (usually the BaseFont, e.g. `ABCDEF+Arial-BoldMT`)
    pub font_name: String,
    /// Advance width in page units
    pub width: f32,
    /// Index of the showing operator in [`PageRecord::operators`]
    pub op_index: Option<usize>,
    /// Explicit color when the supplier knows it
    pub color: Option<Rgb>,
}

impl RawGlyphRun {
    /// Create a run positioned by `transform`.
    pub fn new(
        text: impl Into<String>,
        font_name: impl Into<String>,
        transform: Matrix,
        width: f32,
    ) -> Self {
        Self {
            transform,
            text: text.into(),
            font_name: font_name.into(),
            width,
            op_index: None,
            color: None,
        }
    }

    /// Attach the operator index the run was drawn at.
    pub fn at_op(mut self, index: usize) -> Self {
        self.op_index = Some(index);
        self
    }

    /// Attach an explicit color.
    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }
}

/// Everything the pipeline receives for one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Page number (1-indexed)
    pub number: u32,
    /// Viewport width in page units
    pub viewport_width: f32,
    /// Viewport height in page units
    pub viewport_height: f32,
    /// Operators in content-stream order
    pub operators: Vec<PaintOp>,
    /// Glyph runs in content-stream order
    pub glyph_runs: Vec<RawGlyphRun>,
}

impl PageRecord {
    /// Create an empty record for a page of the given size.
    pub fn new(number: u32, viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            number,
            viewport_width,
            viewport_height,
            ..Default::default()
        }
    }

    /// US Letter sized record (612 x 792).
    pub fn letter(number: u32) -> Self {
        Self::new(number, 612.0, 792.0)
    }

    /// Append an operator, returning its index.
    pub fn push_op(&mut self, op: PaintOp) -> usize {
        self.operators.push(op);
        self.operators.len() - 1
    }

    /// Raw text of the page: run strings joined by single spaces.
    pub fn raw_text(&self) -> String {
        self.glyph_runs
            .iter()
            .map(|run| run.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
