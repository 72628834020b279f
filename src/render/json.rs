//! JSON rendering.

use crate::error::{Error, Result};
use crate::model::Document;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a document (metadata, blocks, diagnostics) to JSON.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(doc),
        JsonFormat::Compact => serde_json::to_string(doc),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FontFamily, FontStyle, FontWeight, LayoutBlock, Rgb, Role};

    fn doc() -> Document {
        let mut doc = Document::new();
        doc.metadata.title = Some("Resume".to_string());
        doc.blocks.push(LayoutBlock {
            role: Role::SubHeader,
            text: "Acme Corp".to_string(),
            indent_px: 0,
            font_size: 12,
            font_weight: FontWeight::Bold,
            font_style: FontStyle::Normal,
            font_family: FontFamily::Calibri,
            color: Rgb::BLACK,
            margin_top_px: 12,
            page: 1,
        });
        doc
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&doc(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"title\""));
        assert!(json.contains("\"sub-header\""));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact_round_trips() {
        let json = to_json(&doc(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));

        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back.blocks, doc().blocks);
    }
}
