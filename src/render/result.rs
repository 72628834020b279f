//! Rendering result with metadata and statistics.

use crate::model::{Document, Metadata, Role};
use serde::{Deserialize, Serialize};

/// Result of rendering a document, including content and statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResult {
    /// The rendered content (HTML, Markdown, text)
    pub content: String,

    /// Document metadata (copied from source document)
    pub metadata: Metadata,

    /// Extraction statistics
    pub stats: ExtractionStats,
}

impl RenderResult {
    /// Create a new render result.
    pub fn new(content: String, metadata: Metadata, stats: ExtractionStats) -> Self {
        Self {
            content,
            metadata,
            stats,
        }
    }

    /// Get the content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Statistics collected over the blocks of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Number of pages that produced at least one block
    pub page_count: u32,

    pub header_count: u32,
    pub sub_header_count: u32,
    pub bullet_count: u32,
    pub numbered_count: u32,
    pub paragraph_count: u32,

    /// Approximate word count (whitespace-separated tokens)
    pub word_count: u32,

    /// Character count (excluding whitespace)
    pub char_count: u32,
}

impl ExtractionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Statistics of a whole document.
    pub fn from_document(doc: &Document) -> Self {
        let mut stats = Self::new();
        let mut last_page = None;
        for block in &doc.blocks {
            if last_page != Some(block.page) {
                stats.page_count += 1;
                last_page = Some(block.page);
            }
            stats.add_block(block.role);
            stats.count_text(&block.text);
        }
        stats
    }

    /// Count one block of the given role.
    pub fn add_block(&mut self, role: Role) {
        match role {
            Role::Header => self.header_count += 1,
            Role::SubHeader => self.sub_header_count += 1,
            Role::Bullet => self.bullet_count += 1,
            Role::Numbered => self.numbered_count += 1,
            Role::Paragraph => self.paragraph_count += 1,
        }
    }

    /// Total number of blocks counted.
    pub fn block_count(&self) -> u32 {
        self.header_count
            + self.sub_header_count
            + self.bullet_count
            + self.numbered_count
            + self.paragraph_count
    }

    /// Add word and character counts from text.
    pub fn count_text(&mut self, text: &str) {
        self.word_count += text.split_whitespace().count() as u32;
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count() as u32;
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ExtractionStats) {
        self.page_count += other.page_count;
        self.header_count += other.header_count;
        self.sub_header_count += other.sub_header_count;
        self.bullet_count += other.bullet_count;
        self.numbered_count += other.numbered_count;
        self.paragraph_count += other.paragraph_count;
        self.word_count += other.word_count;
        self.char_count += other.char_count;
    }
}
