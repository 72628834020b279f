//! Plain text rendering.

use crate::model::Document;

use super::RenderOptions;

/// Convert a document to plain text: one line per block, a blank line
/// between pages.
pub fn to_text(doc: &Document, options: &RenderOptions) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(doc.blocks.len());
    let mut page = None;

    for block in &doc.blocks {
        if page.is_some_and(|p| p != block.page) {
            lines.push(String::new());
        }
        page = Some(block.page);

        let indent = if options.preserve_indent && options.indent_unit_px > 0 {
            (block.indent_px / options.indent_unit_px) as usize
        } else {
            0
        };
        lines.push(format!("{}{}", " ".repeat(indent), block.trimmed_text()));
    }

    lines.join("\n")
}
