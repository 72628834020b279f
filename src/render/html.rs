//! HTML fragment rendering.
//!
//! The fragment is one container `<div>` with a child `<div>` per block. Each
//! child carries a role class and inline styles reproducing indentation,
//! spacing, typography and color.

use std::fmt::Write;

use crate::model::{Document, LayoutBlock};

use super::RenderOptions;

/// Serialize a document as an HTML fragment.
pub fn to_html(doc: &Document, options: &RenderOptions) -> String {
    let mut out = String::with_capacity(doc.blocks.len() * 256 + 64);
    let _ = writeln!(
        out,
        "<div class=\"{}\">",
        html_escape::encode_double_quoted_attribute(&options.container_class)
    );
    for block in &doc.blocks {
        render_block(&mut out, block, options);
    }
    out.push_str("</div>");
    out
}

/// Inline style of one block.
pub fn block_style(block: &LayoutBlock, options: &RenderOptions) -> String {
    format!(
        "margin-left: {}px; margin-top: {}px; font-size: {}px; font-weight: {}; \
         font-style: {}; font-family: {}; color: {}; line-height: {}; white-space: pre-wrap;",
        block.indent_px,
        block.margin_top_px,
        block.font_size,
        block.font_weight.css(),
        block.font_style.css(),
        block.font_family.css(),
        block.color.to_css(),
        options.line_height,
    )
}

fn render_block(out: &mut String, block: &LayoutBlock, options: &RenderOptions) {
    let _ = writeln!(
        out,
        "<div class=\"{}\" style=\"{}\">{}</div>",
        block.role.css_class(),
        block_style(block, options),
        html_escape::encode_text(&block.text)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FontFamily, FontStyle, FontWeight, Rgb, Role};

    fn block(role: Role, text: &str) -> LayoutBlock {
        LayoutBlock {
            role,
            text: text.to_string(),
            indent_px: 10,
            font_size: 18,
            font_weight: FontWeight::Bold,
            font_style: FontStyle::Normal,
            font_family: FontFamily::SansSerif,
            color: Rgb::new(0, 51, 102),
            margin_top_px: 20,
            page: 1,
        }
    }

    #[test]
    fn test_fragment_structure() {
        let mut doc = Document::new();
        doc.blocks.push(block(Role::Header, "EXPERIENCE"));
        doc.blocks.push(block(Role::Bullet, "• Built system"));

        let html = to_html(&doc, &RenderOptions::default());
        assert!(html.starts_with("<div class=\"pdf-content\">\n"));
        assert!(html.ends_with("</div>"));
        assert_eq!(html.matches("<div class=\"header\"").count(), 1);
        assert_eq!(html.matches("<div class=\"bullet\"").count(), 1);
        let header = html.find("EXPERIENCE").unwrap();
        let bullet = html.find("Built system").unwrap();
        assert!(header < bullet);
    }

    #[test]
    fn test_inline_style() {
        let style = block_style(&block(Role::Header, "x"), &RenderOptions::default());
        assert!(style.contains("margin-left: 10px;"));
        assert!(style.contains("margin-top: 20px;"));
        assert!(style.contains("font-size: 18px;"));
        assert!(style.contains("font-weight: bold;"));
        assert!(style.contains("font-style: normal;"));
        assert!(style.contains("font-family: Arial, Helvetica, sans-serif;"));
        assert!(style.contains("color: rgb(0, 51, 102);"));
        assert!(style.contains("line-height: 1.2;"));
        assert!(style.contains("white-space: pre-wrap;"));
    }

    #[test]
    fn test_text_is_escaped_and_spacing_kept() {
        let mut doc = Document::new();
        doc.blocks
            .push(block(Role::Paragraph, "R&D   <team>"));
        let html = to_html(&doc, &RenderOptions::default());
        assert!(html.contains(">R&amp;D   &lt;team&gt;</div>"));
        assert!(html.contains("class=\"text\""));
    }

    #[test]
    fn test_empty_document() {
        let html = to_html(&Document::new(), &RenderOptions::default());
        assert_eq!(html, "<div class=\"pdf-content\">\n</div>");
    }
}
