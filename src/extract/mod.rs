//! End-to-end extraction: PDF bytes to a structured document or, failing
//! that, plain text.
//!
//! The structured path decodes page records, lays every page out and
//! aggregates the blocks in page order. Any error there discards the partial
//! result and runs the plain-text fallback once. Cancellation and timeouts
//! stop everything; they never fall back.

pub mod fallback;

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::detect::detect_format_from_path;
use crate::error::{Error, Result};
use crate::layout::{layout_page, LayoutConfig};
use crate::model::{Document, Metadata, PageLayout, PageRecord};
use crate::parser::{ErrorMode, ParseOptions, PdfParser};
use crate::render::{to_html, RenderOptions};

/// Shared flag for stopping an extraction between pages.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; pages already being laid out finish.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Options for a full extraction.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// How pages are read
    pub parse: ParseOptions,

    /// Layout thresholds
    pub layout: LayoutConfig,

    /// HTML serialization
    pub render: RenderOptions,

    /// Lay pages out on the rayon pool
    pub parallel: bool,

    /// Page-count budget; later pages are skipped
    pub max_pages: Option<usize>,

    /// Wall-clock budget, checked between pages
    pub timeout: Option<Duration>,

    /// Cancellation flag, checked between pages
    pub cancel: Option<CancellationToken>,

    /// Run the plain-text fallback when the structured path fails
    pub fallback: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            parse: ParseOptions::default(),
            layout: LayoutConfig::default(),
            render: RenderOptions::default(),
            parallel: true,
            max_pages: None,
            timeout: None,
            cancel: None,
            fallback: true,
        }
    }
}

impl ExtractOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parse_options(mut self, parse: ParseOptions) -> Self {
        self.parse = parse;
        self
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_render_options(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    /// Process pages one after another on the calling thread.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Return the structured error instead of falling back to plain text.
    pub fn without_fallback(mut self) -> Self {
        self.fallback = false;
        self
    }
}

/// Outcome of an extraction: one shape or the other, never a mix.
#[derive(Debug, Clone)]
pub enum Extraction {
    /// The layout pipeline succeeded
    Structured { document: Document, html: String },
    /// The layout pipeline failed and raw text was recovered instead
    PlainText(String),
}

impl Extraction {
    /// The single output string: the HTML fragment or the plain text.
    pub fn content(&self) -> &str {
        match self {
            Extraction::Structured { html, .. } => html,
            Extraction::PlainText(text) => text,
        }
    }

    pub fn into_content(self) -> String {
        match self {
            Extraction::Structured { html, .. } => html,
            Extraction::PlainText(text) => text,
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Extraction::Structured { .. })
    }

    pub fn document(&self) -> Option<&Document> {
        match self {
            Extraction::Structured { document, .. } => Some(document),
            Extraction::PlainText(_) => None,
        }
    }
}

/// Time and cancellation limits of one extraction call.
#[derive(Debug, Clone)]
struct Budget {
    started: Instant,
    timeout: Option<Duration>,
    cancel: Option<CancellationToken>,
}

impl Budget {
    fn start(options: &ExtractOptions) -> Self {
        Self {
            started: Instant::now(),
            timeout: options.timeout,
            cancel: options.cancel.clone(),
        }
    }

    /// Fails if the next page must not be started.
    fn check(&self, page: u32) -> Result<()> {
        if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
            return Err(Error::Cancelled(page));
        }
        if let Some(limit) = self.timeout {
            let elapsed = self.started.elapsed();
            if elapsed >= limit {
                return Err(Error::Timeout {
                    page,
                    elapsed_ms: elapsed.as_millis(),
                });
            }
        }
        Ok(())
    }
}

/// Extract from an in-memory PDF.
pub fn extract_bytes(data: &[u8], options: &ExtractOptions) -> Result<Extraction> {
    let budget = Budget::start(options);
    let structured = structured_document(data, options, &budget);
    finish(structured, options, || fallback::plain_text(data, &options.parse))
}

/// Extract from a PDF file.
pub fn extract_file<P: AsRef<Path>>(path: P, options: &ExtractOptions) -> Result<Extraction> {
    let path = path.as_ref();
    detect_format_from_path(path)?;
    let data = fs::read(path)?;
    extract_bytes(&data, options)
}

/// Extract from a reader.
pub fn extract_reader<R: std::io::Read>(
    mut reader: R,
    options: &ExtractOptions,
) -> Result<Extraction> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    extract_bytes(&data, options)
}

/// Extract from page records supplied by the caller.
///
/// The fallback joins the text of the same records.
pub fn extract_records(records: &[PageRecord], options: &ExtractOptions) -> Result<Extraction> {
    let budget = Budget::start(options);
    let structured = layout_records_within(records, Metadata::default(), options, &budget);
    finish(structured, options, || {
        Ok(fallback::plain_text_from_records(records))
    })
}

/// Lay out page records and aggregate them into one document.
pub fn layout_records(records: &[PageRecord], options: &ExtractOptions) -> Result<Document> {
    let budget = Budget::start(options);
    layout_records_within(records, Metadata::default(), options, &budget)
}

/// Structured path only: decode, lay out and aggregate, without fallback.
fn structured_document(
    data: &[u8],
    options: &ExtractOptions,
    budget: &Budget,
) -> Result<Document> {
    let parser = PdfParser::from_bytes_with_options(data, options.parse.clone())?;
    let metadata = parser.metadata();
    let records = read_records(&parser, options, budget)?;
    layout_records_within(&records, metadata, options, budget)
}

fn finish<F>(structured: Result<Document>, options: &ExtractOptions, fallback: F) -> Result<Extraction>
where
    F: FnOnce() -> Result<String>,
{
    match structured {
        Ok(document) => {
            let html = to_html(&document, &options.render);
            Ok(Extraction::Structured { document, html })
        }
        Err(e) if e.is_terminal() || !options.fallback => Err(e),
        Err(structured) => {
            log::warn!(
                "Structured extraction failed ({}), falling back to plain text",
                structured
            );
            match fallback() {
                Ok(text) => Ok(Extraction::PlainText(text)),
                Err(fallback) => Err(Error::ExtractionFailed {
                    structured: Box::new(structured),
                    fallback: Box::new(fallback),
                }),
            }
        }
    }
}

fn read_records(
    parser: &PdfParser,
    options: &ExtractOptions,
    budget: &Budget,
) -> Result<Vec<PageRecord>> {
    let pages = parser.selected_pages();
    let limit = options.max_pages.unwrap_or(usize::MAX);
    if pages.len() > limit {
        log::warn!(
            "Page budget of {} reached, skipping {} of {} pages",
            limit,
            pages.len() - limit,
            pages.len()
        );
    }

    let mut records = Vec::with_capacity(pages.len().min(limit));
    for (number, page_id) in pages.into_iter().take(limit) {
        budget.check(number)?;
        match crate::parser::read_page(parser.backend(), number, page_id) {
            Ok(record) => records.push(record),
            Err(e) if parser.options().error_mode == ErrorMode::Lenient => {
                log::warn!("Skipping page {}: {}", number, e);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(records)
}

fn layout_records_within(
    records: &[PageRecord],
    metadata: Metadata,
    options: &ExtractOptions,
    budget: &Budget,
) -> Result<Document> {
    let limit = options.max_pages.unwrap_or(usize::MAX);
    let records = &records[..records.len().min(limit)];

    let lay_out = |record: &PageRecord| -> Result<PageLayout> {
        budget.check(record.number)?;
        layout_page(record, &options.layout)
    };

    // collect() keeps input order, so pages stay in order either way
    let layouts: Vec<PageLayout> = if options.parallel {
        records.par_iter().map(lay_out).collect::<Result<_>>()?
    } else {
        records.iter().map(lay_out).collect::<Result<_>>()?
    };

    let mut document = Document::with_metadata(metadata);
    for page in layouts {
        document.append_page(page);
    }
    log::debug!(
        "Aggregated {} blocks from {} pages",
        document.len(),
        records.len()
    );
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Matrix, RawGlyphRun, Role};

    fn run(text: &str, font: &str, x: f32, y: f32, size: f32) -> RawGlyphRun {
        RawGlyphRun::new(
            text,
            font,
            Matrix::new(size, 0.0, 0.0, size, x, y),
            text.chars().count() as f32 * size * 0.5,
        )
    }

    fn page(number: u32, text: &str) -> PageRecord {
        let mut record = PageRecord::letter(number);
        record.glyph_runs.push(run(text, "Helvetica", 50.0, 700.0, 10.0));
        record
    }

    #[test]
    fn test_pages_aggregate_in_order() {
        let records: Vec<PageRecord> = (1..=12).map(|n| page(n, &format!("page {n}"))).collect();
        let doc = layout_records(&records, &ExtractOptions::default()).unwrap();
        let pages: Vec<u32> = doc.blocks.iter().map(|b| b.page).collect();
        assert_eq!(pages, (1..=12).collect::<Vec<_>>());

        let sequential = layout_records(&records, &ExtractOptions::default().sequential()).unwrap();
        assert_eq!(sequential.blocks, doc.blocks);
    }

    #[test]
    fn test_max_pages_budget() {
        let records: Vec<PageRecord> = (1..=5).map(|n| page(n, "text")).collect();
        let doc = layout_records(&records, &ExtractOptions::new().with_max_pages(2)).unwrap();
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_cancellation_is_terminal() {
        let token = CancellationToken::new();
        token.cancel();

        let mut bad = page(1, "x");
        bad.glyph_runs[0].transform.f = f32::NAN;
        let options = ExtractOptions::new().with_cancellation(token);

        let err = extract_records(&[bad], &options).unwrap_err();
        assert!(matches!(err, Error::Cancelled(1)));
    }

    #[test]
    fn test_timeout_is_terminal() {
        let options = ExtractOptions::new().with_timeout(Duration::ZERO);
        let err = extract_records(&[page(1, "x")], &options).unwrap_err();
        assert!(matches!(err, Error::Timeout { page: 1, .. }));
    }

    #[test]
    fn test_layout_error_falls_back_to_text() {
        let good = page(1, "Hello there");
        let mut bad = page(2, "Broken run");
        bad.glyph_runs[0].transform.e = f32::INFINITY;

        let extraction = extract_records(&[good, bad], &ExtractOptions::default()).unwrap();
        assert!(!extraction.is_structured());
        assert_eq!(extraction.content(), "Hello there\nBroken run");
        assert!(extraction.document().is_none());
    }

    #[test]
    fn test_fallback_can_be_disabled() {
        let mut bad = page(1, "Broken");
        bad.glyph_runs[0].transform.d = f32::NAN;
        let err = extract_records(&[bad], &ExtractOptions::new().without_fallback()).unwrap_err();
        assert!(matches!(err, Error::Layout { page: 1, .. }));
    }

    #[test]
    fn test_structured_content_is_html() {
        let extraction =
            extract_records(&[page(1, "Hello")], &ExtractOptions::default()).unwrap();
        assert!(extraction.is_structured());
        assert!(extraction.content().starts_with("<div class=\"pdf-content\">"));
        let doc = extraction.document().unwrap();
        assert_eq!(doc.blocks[0].role, Role::Paragraph);
    }

    #[test]
    fn test_garbage_bytes_report_both_failures() {
        let err = extract_bytes(b"definitely not a pdf", &ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, Error::ExtractionFailed { .. }));
        assert!(!err.to_string().is_empty());
    }
}
