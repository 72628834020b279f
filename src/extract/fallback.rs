//! Plain-text extraction used when the structured pipeline fails.

use crate::error::Result;
use crate::model::PageRecord;
use crate::parser::{ErrorMode, ParseOptions, PdfParser};

/// Re-read `data` and return its raw text: runs joined by single spaces,
/// pages joined by newlines.
///
/// Pages that fail to decode are skipped; an unreadable document is an error.
pub fn plain_text(data: &[u8], options: &ParseOptions) -> Result<String> {
    let options = options.clone().with_error_mode(ErrorMode::Lenient);
    let parser = PdfParser::from_bytes_with_options(data, options)?;
    let records = parser.page_records()?;
    Ok(plain_text_from_records(&records))
}

/// Raw text of already decoded pages.
pub fn plain_text_from_records(records: &[PageRecord]) -> String {
    records
        .iter()
        .map(PageRecord::raw_text)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Matrix, RawGlyphRun};

    #[test]
    fn test_pages_joined_by_newline() {
        let mut first = PageRecord::letter(1);
        first
            .glyph_runs
            .push(RawGlyphRun::new("EXPERIENCE", "Arial-Bold", Matrix::IDENTITY, 0.0));
        first
            .glyph_runs
            .push(RawGlyphRun::new("• Built system", "Arial", Matrix::IDENTITY, 0.0));
        let mut second = PageRecord::letter(2);
        second
            .glyph_runs
            .push(RawGlyphRun::new("Page two", "Arial", Matrix::IDENTITY, 0.0));

        assert_eq!(
            plain_text_from_records(&[first, second]),
            "EXPERIENCE • Built system\nPage two"
        );
    }

    #[test]
    fn test_unreadable_bytes_fail() {
        assert!(plain_text(b"%PDF-1.4 truncated", &ParseOptions::default()).is_err());
    }
}
