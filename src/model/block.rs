//! Classified layout blocks.

use super::{FontFamily, FontStyle, FontWeight, Rgb};
use serde::{Deserialize, Serialize};

/// Semantic role inferred for one visual line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Header,
    SubHeader,
    Bullet,
    Numbered,
    Paragraph,
}

impl Role {
    /// Class name used in the HTML fragment.
    pub fn css_class(&self) -> &'static str {
        match self {
            Role::Header => "header",
            Role::SubHeader => "sub-header",
            Role::Bullet => "bullet",
            Role::Numbered => "numbered",
            Role::Paragraph => "text",
        }
    }

    /// Whether this role is a list item.
    pub fn is_list_item(&self) -> bool {
        matches!(self, Role::Bullet | Role::Numbered)
    }

    /// Whether this role is a heading.
    pub fn is_heading(&self) -> bool {
        matches!(self, Role::Header | Role::SubHeader)
    }
}

/// A role-tagged line of reconstructed content with its visual attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutBlock {
    /// Inferred role
    pub role: Role,
    /// Line text with reconstructed inter-item spacing
    pub text: String,
    /// Left indentation relative to the base margin, in px
    pub indent_px: u32,
    /// Largest font size on the line, in px
    pub font_size: u32,
    /// Weight of the dominant item
    pub font_weight: FontWeight,
    /// Style of the dominant item
    pub font_style: FontStyle,
    /// Family of the dominant item
    pub font_family: FontFamily,
    /// Fill color of the dominant item
    pub color: Rgb,
    /// Top margin, in px
    pub margin_top_px: u32,
    /// Source page (1-indexed)
    pub page: u32,
}

impl LayoutBlock {
    /// Text with surrounding whitespace removed.
    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }

    /// Whitespace-separated words of this block.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.text.split_whitespace()
    }
}
