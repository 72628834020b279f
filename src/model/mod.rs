//! Data model shared by the parser, the layout pipeline and the renderers.
//!
//! Page records flow in from a page decoder, layout blocks flow out of the
//! classifier, and a [`Document`] aggregates the blocks of every page.

mod block;
mod document;
mod record;
mod style;

pub use block::{LayoutBlock, Role};
pub use document::{Discovery, Document, Metadata, PageLayout};
pub use record::{Matrix, PageRecord, PaintOp, RawGlyphRun};
pub use style::{FontFamily, FontStyle, FontWeight, Rgb};
