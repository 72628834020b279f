//! Serialization of an aggregated document to output formats.
//!
//! Every renderer runs once over the finished [`Document`](crate::model::Document).

mod html;
mod json;
mod markdown;
mod options;
mod result;
mod text;

pub use html::{block_style, to_html};
pub use json::{to_json, JsonFormat};
pub use markdown::{to_markdown, to_markdown_with_stats, MarkdownRenderer};
pub use options::RenderOptions;
pub use result::{ExtractionStats, RenderResult};
pub use text::to_text;
