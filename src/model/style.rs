//! Visual style attributes carried from glyphs to blocks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An 8-bit-per-channel RGB color.
///
/// Every source color space is canonicalized to this type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Black, the initial fill color of every page.
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    /// White.
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    /// Create a color from channel values.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Whether this is pure black.
    pub fn is_black(&self) -> bool {
        *self == Self::BLACK
    }

    /// CSS functional notation, e.g. `rgb(0, 51, 102)`.
    pub fn to_css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Font family bucket inferred from a font resource name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    /// Arial / Helvetica and look-alikes
    SansSerif,
    /// Calibri
    Calibri,
    /// Verdana
    Verdana,
    /// Anything else
    Serif,
}

impl FontFamily {
    /// CSS `font-family` value for this bucket.
    pub fn css(&self) -> &'static str {
        match self {
            FontFamily::SansSerif => "Arial, Helvetica, sans-serif",
            FontFamily::Calibri => "Calibri, Carlito, sans-serif",
            FontFamily::Verdana => "Verdana, Geneva, sans-serif",
            FontFamily::Serif => "'Times New Roman', Times, serif",
        }
    }
}

impl Default for FontFamily {
    fn default() -> Self {
        FontFamily::Serif
    }
}

/// Font weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    /// CSS `font-weight` value.
    pub fn css(&self) -> &'static str {
        match self {
            FontWeight::Normal => "normal",
            FontWeight::Bold => "bold",
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(self, FontWeight::Bold)
    }
}

/// Font style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

impl FontStyle {
    /// CSS `font-style` value.
    pub fn css(&self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
        }
    }
}
