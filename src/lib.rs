//! # pdfblocks
//!
//! Reconstruct the visual structure of PDF pages as styled, role-labeled
//! blocks.
//!
//! Every page is decoded into positioned glyph runs and paint operators, the
//! runs are grouped into lines, and each line is classified as a header,
//! sub-header, bullet, numbered item or paragraph. The result carries the
//! indentation, font size, weight, style, family and fill color of each line
//! and serializes to an HTML fragment, Markdown, plain text or JSON.
//!
//! When the structured path fails the document is re-read as plain text.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfblocks::{extract_file, ExtractOptions};
//!
//! fn main() -> pdfblocks::Result<()> {
//!     let extraction = extract_file("resume.pdf", &ExtractOptions::default())?;
//!     println!("{}", extraction.content());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Role labeling**: headers, sub-headers, bullets, numbered items, paragraphs
//! - **Style capture**: indentation, font size, weight, style, family, color
//! - **Parallel layout**: pages are laid out on Rayon's pool, in page order
//! - **Plain-text fallback**: raw text when layout reconstruction fails
//! - **Budgets**: page limits, timeouts and cancellation between pages

pub mod detect;
pub mod error;
pub mod extract;
pub mod layout;
pub mod model;
pub mod parser;
pub mod render;

pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use error::{Error, Result};
pub use extract::{
    extract_bytes, extract_file, extract_reader, extract_records, layout_records,
    CancellationToken, ExtractOptions, Extraction,
};
pub use layout::{layout_page, LayoutConfig};
pub use model::{
    Discovery, Document, FontFamily, FontStyle, FontWeight, LayoutBlock, Matrix, Metadata,
    PageLayout, PageRecord, PaintOp, RawGlyphRun, Rgb, Role,
};
pub use parser::{ErrorMode, PageSelection, ParseOptions, PdfParser};
pub use render::{ExtractionStats, JsonFormat, RenderOptions, RenderResult};

use std::path::Path;

/// Lay out a PDF file without the plain-text fallback.
///
/// # Example
///
/// ```no_run
/// use pdfblocks::parse_file;
///
/// let doc = parse_file("resume.pdf").unwrap();
/// println!("Blocks: {}", doc.len());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    Pdfblocks::new()
        .without_fallback()
        .parse(path)
        .map(|result| result.document)
}

/// Lay out an in-memory PDF without the plain-text fallback.
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    Pdfblocks::new()
        .without_fallback()
        .parse_bytes(data)
        .map(|result| result.document)
}

/// Extract the single output string of a PDF file: the HTML fragment, or the
/// plain text when layout reconstruction failed.
///
/// ```no_run
/// let html = pdfblocks::to_html("resume.pdf").unwrap();
/// std::fs::write("resume.html", html).unwrap();
/// ```
pub fn to_html<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(extract_file(path, &ExtractOptions::default())?.into_content())
}

/// Convert a PDF file to Markdown.
pub fn to_markdown<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = parse_file(path)?;
    Ok(render::to_markdown(&doc, &RenderOptions::default()))
}

/// Convert a PDF file to block text, one line per block.
pub fn to_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = parse_file(path)?;
    Ok(render::to_text(&doc, &RenderOptions::default()))
}

/// Convert a PDF file to JSON.
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = parse_file(path)?;
    render::to_json(&doc, format)
}

/// Raw text of a PDF file, pages separated by newlines.
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let data = std::fs::read(path)?;
    extract::fallback::plain_text(&data, &ParseOptions::default())
}

/// Extract a PDF file without blocking the async runtime.
#[cfg(feature = "async")]
pub async fn extract_file_async<P: AsRef<Path>>(
    path: P,
    options: ExtractOptions,
) -> Result<Extraction> {
    detect_format_from_path(path.as_ref())?;
    let data = tokio::fs::read(path.as_ref()).await?;
    tokio::task::spawn_blocking(move || extract_bytes(&data, &options))
        .await
        .map_err(|e| Error::Other(format!("extraction task failed: {}", e)))?
}

/// Builder for extracting PDF documents.
///
/// # Example
///
/// ```no_run
/// use pdfblocks::Pdfblocks;
///
/// let markdown = Pdfblocks::new()
///     .lenient()
///     .with_max_pages(3)
///     .with_frontmatter()
///     .parse("resume.pdf")?
///     .to_markdown();
/// # Ok::<(), pdfblocks::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pdfblocks {
    options: ExtractOptions,
}

impl Pdfblocks {
    /// Create a builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip undecodable pages instead of failing.
    pub fn lenient(mut self) -> Self {
        self.options.parse = self.options.parse.lenient();
        self
    }

    /// Lay pages out on the calling thread.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.options.parse = self.options.parse.with_pages(pages);
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.options = self.options.with_max_pages(max_pages);
        self
    }

    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.options = self.options.with_timeout(timeout);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.options = self.options.with_cancellation(token);
        self
    }

    /// Replace the layout thresholds.
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.options = self.options.with_layout(layout);
        self
    }

    /// Enable frontmatter in Markdown output.
    pub fn with_frontmatter(mut self) -> Self {
        self.options.render = self.options.render.with_frontmatter(true);
        self
    }

    /// Fail instead of falling back to plain text.
    pub fn without_fallback(mut self) -> Self {
        self.options = self.options.without_fallback();
        self
    }

    /// The options this builder has collected.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Run the full extraction, fallback included, on a file.
    pub fn extract<P: AsRef<Path>>(&self, path: P) -> Result<Extraction> {
        extract_file(path, &self.options)
    }

    /// Run the full extraction, fallback included, on bytes.
    pub fn extract_bytes(&self, data: &[u8]) -> Result<Extraction> {
        extract_bytes(data, &self.options)
    }

    /// Lay out a file and keep the document for rendering.
    pub fn parse<P: AsRef<Path>>(self, path: P) -> Result<PdfblocksResult> {
        let extraction = extract_file(path, &self.options.clone().without_fallback())?;
        self.into_result(extraction)
    }

    /// Lay out bytes and keep the document for rendering.
    pub fn parse_bytes(self, data: &[u8]) -> Result<PdfblocksResult> {
        let extraction = extract_bytes(data, &self.options.clone().without_fallback())?;
        self.into_result(extraction)
    }

    fn into_result(self, extraction: Extraction) -> Result<PdfblocksResult> {
        match extraction {
            Extraction::Structured { document, .. } => Ok(PdfblocksResult {
                document,
                render_options: self.options.render,
            }),
            Extraction::PlainText(_) => Err(Error::Other(
                "structured extraction returned plain text".to_string(),
            )),
        }
    }
}

/// A laid-out document plus the render options chosen on the builder.
#[derive(Debug, Clone)]
pub struct PdfblocksResult {
    /// The aggregated document
    pub document: Document,
    render_options: RenderOptions,
}

impl PdfblocksResult {
    pub fn to_html(&self) -> String {
        render::to_html(&self.document, &self.render_options)
    }

    pub fn to_markdown(&self) -> String {
        render::to_markdown(&self.document, &self.render_options)
    }

    pub fn to_text(&self) -> String {
        render::to_text(&self.document, &self.render_options)
    }

    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Block text joined by newlines.
    pub fn plain_text(&self) -> String {
        self.document.plain_text()
    }

    pub fn stats(&self) -> ExtractionStats {
        ExtractionStats::from_document(&self.document)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}
