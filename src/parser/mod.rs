//! PDF reading: backend access, content stream replay and page records.

pub mod backend;
pub mod interpreter;
mod options;
mod pdf_parser;

pub use backend::{LopdfBackend, PageBox, PdfBackend};
pub use interpreter::read_page;
pub use options::{ErrorMode, PageSelection, ParseOptions};
pub use pdf_parser::PdfParser;
