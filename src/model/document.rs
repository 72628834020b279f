//! Document-level types.

use super::{FontFamily, LayoutBlock, Rgb, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Blocks reconstructed from a whole document, in page order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata (title, author, etc.)
    pub metadata: Metadata,

    /// Blocks across all pages, page order then top-to-bottom
    pub blocks: Vec<LayoutBlock>,

    /// Colors and fonts seen while normalizing glyphs
    pub diagnostics: Discovery,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty document carrying metadata.
    pub fn with_metadata(metadata: Metadata) -> Self {
        Self {
            metadata,
            ..Default::default()
        }
    }

    /// Append one page's blocks after everything aggregated so far.
    pub fn append_page(&mut self, page: PageLayout) {
        self.blocks.extend(page.blocks);
        self.diagnostics.merge(&page.discovery);
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether no block was produced.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Blocks with the given role.
    pub fn blocks_with_role(&self, role: Role) -> impl Iterator<Item = &LayoutBlock> {
        self.blocks.iter().filter(move |b| b.role == role)
    }

    /// Blocks that came from one page.
    pub fn page_blocks(&self, page: u32) -> impl Iterator<Item = &LayoutBlock> {
        self.blocks.iter().filter(move |b| b.page == page)
    }

    /// Plain text: one block per line.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.trimmed_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Layout result of a single page, before aggregation.
#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    /// Page number (1-indexed)
    pub number: u32,
    /// Blocks on this page, top to bottom
    pub blocks: Vec<LayoutBlock>,
    /// Colors and fonts seen on this page
    pub discovery: Discovery,
}

/// Distinct colors and font families seen while normalizing glyphs.
///
/// Diagnostic only; nothing downstream depends on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discovery {
    pub colors: BTreeSet<Rgb>,
    pub fonts: BTreeSet<FontFamily>,
}

impl Discovery {
    pub fn record(&mut self, color: Rgb, font: FontFamily) {
        self.colors.insert(color);
        self.fonts.insert(font);
    }

    pub fn merge(&mut self, other: &Discovery) {
        self.colors.extend(other.colors.iter().copied());
        self.fonts.extend(other.fonts.iter().copied());
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Creator application
    pub creator: Option<String>,

    /// PDF producer
    pub producer: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,

    /// PDF version (e.g., "1.7")
    pub pdf_version: String,

    /// Total number of pages in the file
    pub page_count: u32,

    /// Whether the document is encrypted
    pub encrypted: bool,
}

impl Metadata {
    /// Create new metadata with PDF version.
    pub fn with_version(version: impl Into<String>) -> Self {
        Self {
            pdf_version: version.into(),
            ..Default::default()
        }
    }

    /// YAML frontmatter block, terminated by a blank line.
    pub fn to_yaml_frontmatter(&self) -> String {
        let mut lines = vec!["---".to_string()];

        let fields = [
            ("title", &self.title),
            ("author", &self.author),
            ("subject", &self.subject),
            ("creator", &self.creator),
            ("producer", &self.producer),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                lines.push(format!("{}: \"{}\"", key, escape_yaml(value)));
            }
        }
        if let Some(created) = self.created {
            lines.push(format!("created: {}", created.to_rfc3339()));
        }
        if let Some(modified) = self.modified {
            lines.push(format!("modified: {}", modified.to_rfc3339()));
        }

        lines.push(format!("pdf_version: \"{}\"", self.pdf_version));
        lines.push(format!("pages: {}", self.page_count));
        lines.push("---".to_string());
        lines.push(String::new());
        lines.join("\n")
    }
}

fn escape_yaml(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
