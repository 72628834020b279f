//! PDF backend abstraction layer.
//!
//! Provides a trait-based interface for the PDF operations the page
//! interpreter needs, isolating the concrete PDF library (lopdf) from the
//! rest of the crate.

use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result};

/// Width of a CID glyph missing from `/W` when the font has no `/DW`.
const DEFAULT_CID_WIDTH: f32 = 1000.0;

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// Font information returned by the backend.
#[derive(Debug, Clone, Default)]
pub struct BackendFontInfo {
    /// Font resource name (key in the page's font dictionary).
    pub name: Vec<u8>,
    /// Base font name (e.g., "Helvetica-Bold").
    pub base_font: String,
    /// First character code covered by `widths`.
    pub first_char: u32,
    /// Glyph widths in 1/1000 em, starting at `first_char`.
    pub widths: Vec<f32>,
    /// Type0 font: two-byte codes, metrics from the descendant CIDFont.
    pub composite: bool,
    /// Descendant `/W` entries by CID.
    pub cid_widths: HashMap<u32, f32>,
    /// Descendant `/DW`.
    pub default_width: f32,
}

impl BackendFontInfo {
    /// Width of a character code in 1/1000 em, if the font declares it.
    pub fn glyph_width(&self, code: u32) -> Option<f32> {
        if self.composite {
            return Some(
                self.cid_widths
                    .get(&code)
                    .copied()
                    .unwrap_or(self.default_width),
            );
        }
        let index = code.checked_sub(self.first_char)?;
        self.widths.get(index as usize).copied()
    }

    /// Whether the font carries any width information.
    pub fn has_metrics(&self) -> bool {
        self.composite || !self.widths.is_empty()
    }

    /// Split a shown string into character codes.
    ///
    /// Composite fonts are read as big-endian two-byte codes (Identity-H/V);
    /// a trailing odd byte becomes its own code.
    pub fn char_codes(&self, bytes: &[u8]) -> Vec<u32> {
        if !self.composite {
            return bytes.iter().map(|&b| b as u32).collect();
        }
        bytes
            .chunks(2)
            .map(|pair| match pair {
                [hi, lo] => u16::from_be_bytes([*hi, *lo]) as u32,
                [single] => *single as u32,
                _ => 0,
            })
            .collect()
    }
}

/// Page boundaries in default user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub llx: f32,
    pub lly: f32,
    pub urx: f32,
    pub ury: f32,
}

impl PageBox {
    /// US Letter, used when a page declares no usable MediaBox.
    pub const LETTER: PageBox = PageBox {
        llx: 0.0,
        lly: 0.0,
        urx: 612.0,
        ury: 792.0,
    };

    pub fn width(&self) -> f32 {
        (self.urx - self.llx).abs()
    }

    pub fn height(&self) -> f32 {
        (self.ury - self.lly).abs()
    }
}

/// A value from a PDF content stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    pub fn new(operator: impl Into<String>, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }

    /// Numeric operand at `index`.
    pub fn number(&self, index: usize) -> Option<f32> {
        self.operands.get(index).and_then(get_number_from_value)
    }

    /// All operands as numbers, `None` if any is not numeric.
    pub fn numbers(&self) -> Option<Vec<f32>> {
        self.operands.iter().map(get_number_from_value).collect()
    }
}

/// Abstract interface for PDF document access.
///
/// Implementations provide page enumeration, page boxes, font metrics,
/// content stream decoding and text decoding without exposing any concrete
/// PDF library types.
pub trait PdfBackend {
    /// Return all pages as (page_number → PageId).
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Return the MediaBox of a page, inherited from the page tree if needed.
    fn page_box(&self, page: PageId) -> Result<PageBox>;

    /// Return font info for a given page.
    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>>;

    /// Return the raw (decompressed) content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>>;

    /// Parse raw content stream bytes into a sequence of operations.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>>;

    /// Build the text decoder for a page once, from its font resources.
    fn text_decoder<'a>(&'a self, page: PageId) -> Box<dyn TextDecoder + 'a>;
}

/// Maps shown strings to Unicode with a page's font encodings.
pub trait TextDecoder {
    /// Decode with the named font's encoding; `None` when it has no usable one.
    fn decode(&self, font_name: &[u8], bytes: &[u8]) -> Option<String>;
}

/// Decoder for pages whose fonts carry no usable encoding.
pub struct NoEncodings;

impl TextDecoder for NoEncodings {
    fn decode(&self, _font_name: &[u8], _bytes: &[u8]) -> Option<String> {
        None
    }
}

/// Decoding used when the font's encoding is unknown.
///
/// Composite fonts without a ToUnicode map are read as UTF-16BE codes.
pub fn decode_text_fallback(font: Option<&BackendFontInfo>, bytes: &[u8]) -> String {
    match font {
        Some(f) if f.composite => {
            let units: Vec<u16> = f.char_codes(bytes).into_iter().map(|c| c as u16).collect();
            String::from_utf16_lossy(&units)
        }
        _ => decode_text_simple(bytes),
    }
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if let [0xFE, 0xFF, rest @ ..] = bytes {
        let utf16: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

// ---------------------------------------------------------------------------
// LopdfBackend
// ---------------------------------------------------------------------------

use lopdf::{Dictionary, Document as LopdfDocument, Encoding, Object};

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        Self::checked(LopdfDocument::load(path)?)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        Self::checked(LopdfDocument::load_mem(data)?)
    }

    /// Reject documents whose trailer does not lead to a page tree.
    fn checked(doc: LopdfDocument) -> Result<Self> {
        let catalog = doc
            .catalog()
            .map_err(|e| Error::Corrupted(format!("no document catalog: {}", e)))?;
        if !catalog.has(b"Pages") {
            return Err(Error::Corrupted("catalog has no /Pages entry".to_string()));
        }
        Ok(Self { doc })
    }

    /// Direct access to the underlying `lopdf::Document`, for metadata.
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).ok(),
            other => Some(other),
        }
    }

    fn resolve_number(&self, obj: &Object) -> Option<f32> {
        match self.resolve(obj)? {
            Object::Integer(i) => Some(*i as f32),
            Object::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// Walk up the page tree to find the MediaBox numbers.
    fn find_media_box(&self, dict: &Dictionary, depth: usize) -> Option<Vec<f32>> {
        if let Some(Object::Array(arr)) = dict.get(b"MediaBox").ok().and_then(|o| self.resolve(o))
        {
            let nums: Option<Vec<f32>> = arr.iter().map(|o| self.resolve_number(o)).collect();
            if let Some(nums) = nums.filter(|n| n.len() == 4) {
                return Some(nums);
            }
        }

        // Guard against cyclic /Parent chains
        if depth > 32 {
            return None;
        }
        let parent_id = dict.get(b"Parent").ok()?.as_reference().ok()?;
        let parent = self.doc.get_dictionary(parent_id).ok()?;
        self.find_media_box(parent, depth + 1)
    }

    fn font_widths(&self, font_dict: &Dictionary) -> (u32, Vec<f32>) {
        let first_char = font_dict
            .get(b"FirstChar")
            .ok()
            .and_then(|o| self.resolve_number(o))
            .map(|n| n.max(0.0) as u32)
            .unwrap_or(0);

        let widths = match font_dict.get(b"Widths").ok().and_then(|o| self.resolve(o)) {
            Some(Object::Array(arr)) => arr
                .iter()
                .map(|o| self.resolve_number(o).unwrap_or(0.0))
                .collect(),
            _ => Vec::new(),
        };

        (first_char, widths)
    }

    /// First entry of a Type0 font's `/DescendantFonts`.
    fn descendant_font<'a>(&'a self, font_dict: &'a Dictionary) -> Option<&'a Dictionary> {
        match self.resolve(font_dict.get(b"DescendantFonts").ok()?)? {
            Object::Array(arr) => self.resolve(arr.first()?)?.as_dict().ok(),
            _ => None,
        }
    }

    /// `/DW` and `/W` of a CIDFont.
    fn cid_font_widths(&self, cid_font: &Dictionary) -> (f32, HashMap<u32, f32>) {
        let default_width = cid_font
            .get(b"DW")
            .ok()
            .and_then(|o| self.resolve_number(o))
            .unwrap_or(DEFAULT_CID_WIDTH);

        let widths = match cid_font.get(b"W").ok().and_then(|o| self.resolve(o)) {
            Some(Object::Array(arr)) => self.parse_w_array(arr),
            _ => HashMap::new(),
        };

        (default_width, widths)
    }

    /// Read a `/W` array: `c [w1 w2 ...]` runs and `c_first c_last w` ranges.
    fn parse_w_array(&self, entries: &[Object]) -> HashMap<u32, f32> {
        let mut widths = HashMap::new();
        let mut rest = entries;

        while let Some((first, tail)) = rest.split_first() {
            rest = tail;
            let Some(start) = self.resolve_number(first).filter(|n| *n >= 0.0) else {
                continue;
            };
            let start = start as u32;

            match rest.split_first().map(|(o, tail)| (self.resolve(o), tail)) {
                Some((Some(Object::Array(run)), tail)) => {
                    for (offset, w) in run.iter().enumerate() {
                        if let Some(w) = self.resolve_number(w) {
                            widths.insert(start.saturating_add(offset as u32), w);
                        }
                    }
                    rest = tail;
                }
                Some((Some(last), tail)) => {
                    let (Some(last), Some((w, tail))) =
                        (self.resolve_number(last), tail.split_first())
                    else {
                        break;
                    };
                    if let Some(w) = self.resolve_number(w) {
                        for cid in start..=(last.max(0.0) as u32).min(u16::MAX as u32) {
                            widths.insert(cid, w);
                        }
                    }
                    rest = tail;
                }
                _ => break,
            }
        }

        widths
    }
}

/// Encodings of one page's fonts, resolved once per page.
struct LopdfTextDecoder<'a> {
    encodings: HashMap<Vec<u8>, Encoding<'a>>,
}

impl TextDecoder for LopdfTextDecoder<'_> {
    fn decode(&self, font_name: &[u8], bytes: &[u8]) -> Option<String> {
        let encoding = self.encodings.get(font_name)?;
        LopdfDocument::decode_text(encoding, bytes).ok()
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_box(&self, page: PageId) -> Result<PageBox> {
        let page_dict = self
            .doc
            .get_dictionary(page)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        match self.find_media_box(page_dict, 0) {
            Some(n) => Ok(PageBox {
                llx: n[0].min(n[2]),
                lly: n[1].min(n[3]),
                urx: n[0].max(n[2]),
                ury: n[1].max(n[3]),
            }),
            None => {
                log::warn!("Page {:?} has no usable MediaBox, assuming Letter", page);
                Ok(PageBox::LETTER)
            }
        }
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>> {
        let lopdf_fonts = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut result = Vec::with_capacity(lopdf_fonts.len());
        for (name, font_dict) in &lopdf_fonts {
            let base_font = font_dict
                .get(b"BaseFont")
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).to_string())
                .unwrap_or_else(|| String::from_utf8_lossy(name).to_string());
            let (first_char, widths) = self.font_widths(font_dict);
            let mut info = BackendFontInfo {
                name: name.clone(),
                base_font,
                first_char,
                widths,
                ..Default::default()
            };
            if is_type0(font_dict) {
                let (default_width, cid_widths) = self
                    .descendant_font(font_dict)
                    .map(|cid_font| self.cid_font_widths(cid_font))
                    .unwrap_or((DEFAULT_CID_WIDTH, HashMap::new()));
                info.composite = true;
                info.default_width = default_width;
                info.cid_widths = cid_widths;
            }
            result.push(info);
        }
        Ok(result)
    }

    fn page_content(&self, page_id: PageId) -> Result<Vec<u8>> {
        // Pages without /Contents are blank, not broken
        let has_contents = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?
            .has(b"Contents");
        if !has_contents {
            return Ok(Vec::new());
        }

        self.doc
            .get_page_content(page_id)
            .map_err(|e| Error::PdfParse(format!("content stream of page {:?}: {}", page_id, e)))
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
        let content =
            lopdf::content::Content::decode(data).map_err(|e| Error::PdfParse(e.to_string()))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }

    fn text_decoder<'a>(&'a self, page: PageId) -> Box<dyn TextDecoder + 'a> {
        let mut encodings = HashMap::new();
        if let Ok(fonts) = self.doc.get_page_fonts(page) {
            // get_font_encoding asserts /Type /Font; untyped fonts use the fallback
            for (name, font_dict) in fonts.into_iter().filter(|(_, f)| f.type_is(b"Font")) {
                if let Ok(encoding) = font_dict.get_font_encoding(&self.doc) {
                    encodings.insert(name, encoding);
                }
            }
        }
        Box::new(LopdfTextDecoder { encodings })
    }
}

fn is_type0(font_dict: &Dictionary) -> bool {
    matches!(font_dict.get(b"Subtype").and_then(Object::as_name), Ok(b"Type0"))
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}

/// Helper: extract a number from a [`PdfValue`].
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(r) => Some(*r),
        _ => None,
    }
}
