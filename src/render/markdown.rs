//! Markdown rendering.

use crate::layout::classify::strip_bullet;
use crate::model::{Document, FontStyle, LayoutBlock, Role};

use super::{ExtractionStats, RenderOptions, RenderResult};

/// Convert a document to Markdown.
pub fn to_markdown(doc: &Document, options: &RenderOptions) -> String {
    MarkdownRenderer::new(options.clone()).render(doc)
}

/// Convert a document to Markdown with statistics.
pub fn to_markdown_with_stats(doc: &Document, options: &RenderOptions) -> RenderResult {
    let content = to_markdown(doc, options);
    RenderResult::new(
        content,
        doc.metadata.clone(),
        ExtractionStats::from_document(doc),
    )
}

/// Markdown renderer.
///
/// Headers become `##`, sub-headers `###`, bullets use the configured list
/// marker, numbered items keep their own enumerator.
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a document to Markdown.
    pub fn render(&self, doc: &Document) -> String {
        let mut output = String::new();

        if self.options.include_frontmatter {
            output.push_str(&doc.metadata.to_yaml_frontmatter());
            output.push('\n');
        }

        let mut prev: Option<Role> = None;
        for block in &doc.blocks {
            // Keep consecutive list items together
            if let Some(p) = prev {
                let tight = p.is_list_item() && block.role.is_list_item();
                output.push_str(if tight { "\n" } else { "\n\n" });
            }
            self.render_block(&mut output, block);
            prev = Some(block.role);
        }

        output.trim().to_string()
    }

    fn render_block(&self, output: &mut String, block: &LayoutBlock) {
        let text = block.trimmed_text();
        match block.role {
            Role::Header => {
                output.push_str("## ");
                output.push_str(&self.escape(text));
            }
            Role::SubHeader => {
                output.push_str("### ");
                output.push_str(&self.escape(text));
            }
            Role::Bullet => {
                let depth = (block.indent_px / 20) as usize;
                output.push_str(&"  ".repeat(depth));
                output.push(self.options.list_marker);
                output.push(' ');
                output.push_str(&self.escape(strip_bullet(text)));
            }
            Role::Numbered => {
                output.push_str(&self.escape(text));
            }
            Role::Paragraph => {
                let escaped = self.escape(text);
                match (block.font_weight.is_bold(), block.font_style) {
                    (true, FontStyle::Italic) => output.push_str(&format!("***{}***", escaped)),
                    (true, FontStyle::Normal) => output.push_str(&format!("**{}**", escaped)),
                    (false, FontStyle::Italic) => output.push_str(&format!("*{}*", escaped)),
                    (false, FontStyle::Normal) => output.push_str(&escaped),
                }
            }
        }
    }

    fn escape(&self, text: &str) -> String {
        if self.options.escape_special_chars {
            escape_markdown(text)
        } else {
            text.to_string()
        }
    }
}

/// Escape characters with inline meaning in Markdown.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '`' | '*' | '_' | '[' | ']' | '|') {
            result.push('\\');
        }
        result.push(c);
    }
    result
}
