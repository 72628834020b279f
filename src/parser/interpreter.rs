//! Content stream replay.
//!
//! Walks a page's content operators, tracking the graphics and text state,
//! and produces a [`PageRecord`]: the paint operators the layout pipeline
//! cares about plus one [`RawGlyphRun`] per text-showing operator.

use std::collections::HashMap;

use super::backend::{
    decode_text_fallback, get_number_from_value, BackendFontInfo, ContentOp, PageBox, PageId,
    PdfBackend, PdfValue, TextDecoder,
};
use crate::error::Result;
use crate::model::{Matrix, PageRecord, PaintOp, RawGlyphRun};

/// Width assumed for glyphs the font does not describe, in 1/1000 em.
const DEFAULT_GLYPH_WIDTH: f32 = 500.0;

/// TJ adjustment (1/1000 em) above which a word space is assumed.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Max nesting of `q` before further saves are ignored.
const MAX_STATE_DEPTH: usize = 256;

/// Read one page through a backend and replay its content.
pub fn read_page<B: PdfBackend + ?Sized>(
    backend: &B,
    number: u32,
    page_id: PageId,
) -> Result<PageRecord> {
    let page_box = backend.page_box(page_id)?;
    let fonts = backend.page_fonts(page_id)?;
    let content = backend.page_content(page_id)?;
    let ops = if content.is_empty() {
        Vec::new()
    } else {
        backend.decode_content(&content)?
    };

    let mut interpreter = PageInterpreter::new(backend, page_id, number, page_box, fonts);
    interpreter.run(&ops);
    Ok(interpreter.finish())
}

/// Text state parameters (PDF 32000-1, 9.3).
#[derive(Debug, Clone)]
struct TextState {
    font: Option<Vec<u8>>,
    font_size: f32,
    char_spacing: f32,
    word_spacing: f32,
    /// Tz / 100
    horizontal_scale: f32,
    leading: f32,
    rise: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: None,
            font_size: 12.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

/// Replays the operators of a single page.
pub struct PageInterpreter<'a> {
    decoder: Box<dyn TextDecoder + 'a>,
    fonts: HashMap<Vec<u8>, BackendFontInfo>,
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    text: TextState,
    tm: Matrix,
    tlm: Matrix,
    in_text: bool,
    record: PageRecord,
}

impl<'a> PageInterpreter<'a> {
    pub fn new<B: PdfBackend + ?Sized>(
        backend: &'a B,
        page_id: PageId,
        number: u32,
        page_box: PageBox,
        fonts: Vec<BackendFontInfo>,
    ) -> Self {
        Self {
            decoder: backend.text_decoder(page_id),
            fonts: fonts.into_iter().map(|f| (f.name.clone(), f)).collect(),
            // Move the MediaBox origin to (0, 0) so the top edge sits at `height`
            ctm: Matrix::translation(-page_box.llx, -page_box.lly),
            ctm_stack: Vec::new(),
            text: TextState::default(),
            tm: Matrix::IDENTITY,
            tlm: Matrix::IDENTITY,
            in_text: false,
            record: PageRecord::new(number, page_box.width(), page_box.height()),
        }
    }

    pub fn run(&mut self, ops: &[ContentOp]) {
        for op in ops {
            self.apply(op);
        }
    }

    pub fn finish(self) -> PageRecord {
        self.record
    }

    fn apply(&mut self, op: &ContentOp) {
        match op.operator.as_str() {
            // Graphics state
            "q" => {
                if self.ctm_stack.len() < MAX_STATE_DEPTH {
                    self.ctm_stack.push(self.ctm);
                }
            }
            "Q" => {
                if let Some(ctm) = self.ctm_stack.pop() {
                    self.ctm = ctm;
                }
            }
            "cm" => {
                if let Some(m) = matrix_operand(op) {
                    self.ctm = m.multiply(&self.ctm);
                }
            }

            // Fill color
            "g" | "rg" | "k" | "sc" | "scn" => {
                let paint = fill_op(op).unwrap_or_else(|| PaintOp::Other(op.operator.clone()));
                self.record.push_op(paint);
                return;
            }

            // Text objects
            "BT" => {
                self.in_text = true;
                self.tm = Matrix::IDENTITY;
                self.tlm = Matrix::IDENTITY;
            }
            "ET" => self.in_text = false,

            // Text state
            "Tf" => {
                if let Some(PdfValue::Name(name)) = op.operands.first() {
                    self.text.font = Some(name.clone());
                }
                if let Some(size) = op.number(1) {
                    self.text.font_size = size;
                }
            }
            "Tc" => self.text.char_spacing = op.number(0).unwrap_or(0.0),
            "Tw" => self.text.word_spacing = op.number(0).unwrap_or(0.0),
            "Tz" => self.text.horizontal_scale = op.number(0).unwrap_or(100.0) / 100.0,
            "TL" => self.text.leading = op.number(0).unwrap_or(0.0),
            "Ts" => self.text.rise = op.number(0).unwrap_or(0.0),

            // Text positioning
            "Td" => {
                if let (Some(tx), Some(ty)) = (op.number(0), op.number(1)) {
                    self.move_line(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (op.number(0), op.number(1)) {
                    self.text.leading = -ty;
                    self.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = matrix_operand(op) {
                    self.tm = m;
                    self.tlm = m;
                }
            }
            "T*" => self.next_line(),

            // Text showing
            "Tj" => {
                let index = self.record.push_op(PaintOp::ShowText);
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    self.show(index, &[TjPart::Text(bytes)]);
                }
                return;
            }
            "TJ" => {
                let index = self.record.push_op(PaintOp::ShowText);
                if let Some(PdfValue::Array(items)) = op.operands.first() {
                    let parts: Vec<TjPart<'_>> = items
                        .iter()
                        .filter_map(|item| match item {
                            PdfValue::Str(bytes) => Some(TjPart::Text(bytes)),
                            other => get_number_from_value(other).map(TjPart::Adjust),
                        })
                        .collect();
                    self.show(index, &parts);
                }
                return;
            }
            "'" => {
                self.next_line();
                let index = self.record.push_op(PaintOp::ShowText);
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    self.show(index, &[TjPart::Text(bytes)]);
                }
                return;
            }
            "\"" => {
                if let (Some(aw), Some(ac)) = (op.number(0), op.number(1)) {
                    self.text.word_spacing = aw;
                    self.text.char_spacing = ac;
                }
                self.next_line();
                let index = self.record.push_op(PaintOp::ShowText);
                if let Some(PdfValue::Str(bytes)) = op.operands.get(2) {
                    self.show(index, &[TjPart::Text(bytes)]);
                }
                return;
            }
            _ => {}
        }

        self.record.push_op(PaintOp::Other(op.operator.clone()));
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.tlm = Matrix::translation(tx, ty).multiply(&self.tlm);
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.text.leading);
    }

    /// Emit one glyph run for a string or TJ array and advance the text matrix.
    fn show(&mut self, op_index: usize, parts: &[TjPart<'_>]) {
        if !self.in_text {
            log::debug!("Text shown outside BT/ET on page {}", self.record.number);
        }

        let ts = &self.text;
        let font_key = ts.font.clone().unwrap_or_default();
        let font = self.fonts.get(&font_key);
        let font_name = font
            .map(|f| f.base_font.clone())
            .unwrap_or_else(|| String::from_utf8_lossy(&font_key).to_string());

        // Glyph space is scaled by font size and Tz; rise shifts the baseline
        let start = Matrix::new(
            ts.font_size * ts.horizontal_scale,
            0.0,
            0.0,
            ts.font_size,
            0.0,
            ts.rise,
        )
        .multiply(&self.tm)
        .multiply(&self.ctm);

        let mut text = String::new();
        let mut advance = 0.0_f32;
        for part in parts {
            match part {
                TjPart::Text(bytes) => {
                    let decoded = self
                        .decoder
                        .decode(&font_key, bytes)
                        .unwrap_or_else(|| decode_text_fallback(font, bytes));
                    text.push_str(&decoded);
                    advance += string_advance(font, ts, bytes);
                }
                TjPart::Adjust(n) => {
                    advance -= n / 1000.0 * ts.font_size * ts.horizontal_scale;
                    if -n > TJ_SPACE_THRESHOLD {
                        push_word_space(&mut text);
                    }
                }
            }
        }

        let user_space = self.tm.multiply(&self.ctm);
        let width = advance * user_space.horizontal_scale();
        self.tm = Matrix::translation(advance, 0.0).multiply(&self.tm);

        if text.trim().is_empty() {
            return;
        }
        self.record
            .glyph_runs
            .push(RawGlyphRun::new(text, font_name, start, width).at_op(op_index));
    }
}

enum TjPart<'b> {
    Text(&'b [u8]),
    Adjust(f32),
}

/// Horizontal advance of a string in unscaled text space.
fn string_advance(font: Option<&BackendFontInfo>, ts: &TextState, bytes: &[u8]) -> f32 {
    let codes = match font {
        Some(f) => f.char_codes(bytes),
        None => bytes.iter().map(|&b| b as u32).collect(),
    };
    // Tw applies to the single-byte code 32 only
    let single_byte = !font.is_some_and(|f| f.composite);
    let described = font.filter(|f| f.has_metrics());
    codes
        .into_iter()
        .map(|code| {
            let w = described
                .and_then(|f| f.glyph_width(code))
                .unwrap_or(DEFAULT_GLYPH_WIDTH);
            let word = if single_byte && code == 32 {
                ts.word_spacing
            } else {
                0.0
            };
            (w / 1000.0 * ts.font_size + ts.char_spacing + word) * ts.horizontal_scale
        })
        .sum()
}

fn push_word_space(text: &mut String) {
    match text.chars().last() {
        Some(c) if c != ' ' && c != '\u{00A0}' && !is_spaceless_script_char(c) => text.push(' '),
        _ => {}
    }
}

/// Six numeric operands as a matrix.
fn matrix_operand(op: &ContentOp) -> Option<Matrix> {
    match op.numbers()?.as_slice() {
        &[a, b, c, d, e, f] => Some(Matrix::new(a, b, c, d, e, f)),
        _ => None,
    }
}

/// Map a fill-color operator onto a [`PaintOp`].
///
/// `sc`/`scn` carry no color space, so the operand count picks one; pattern
/// fills (a trailing name) are not colors.
fn fill_op(op: &ContentOp) -> Option<PaintOp> {
    let n = op.numbers()?;
    match (op.operator.as_str(), n.as_slice()) {
        ("g", &[g]) => Some(PaintOp::SetFillGray(g)),
        ("rg", &[r, g, b]) => Some(PaintOp::SetFillRgb(r, g, b)),
        ("k", &[c, m, y, k]) => Some(PaintOp::SetFillCmyk(c, m, y, k)),
        ("sc" | "scn", &[g]) => Some(PaintOp::SetFillGray(g)),
        ("sc" | "scn", &[r, g, b]) => Some(PaintOp::SetFillRgb(r, g, b)),
        ("sc" | "scn", &[c, m, y, k]) => Some(PaintOp::SetFillCmyk(c, m, y, k)),
        _ => None,
    }
}

/// Whether a character belongs to a script written without word spaces.
///
/// Chinese and Japanese don't use spaces between words; Korean does.
fn is_spaceless_script_char(c: char) -> bool {
    matches!(c as u32,
        0x4E00..=0x9FFF      // CJK Unified Ideographs
        | 0x3400..=0x4DBF    // Extension A
        | 0x20000..=0x2EBEF  // Extensions B-F
        | 0x3040..=0x309F    // Hiragana
        | 0x30A0..=0x30FF    // Katakana
        | 0x3000..=0x303F    // CJK Symbols and Punctuation
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{layout_page, LayoutConfig};
    use crate::parser::backend::NoEncodings;
    use std::cell::Cell;
    use crate::model::{Rgb, Role};
    use std::collections::BTreeMap;

    /// Backend that serves a single page from prepared operators.
    struct MockBackend {
        ops: Vec<ContentOp>,
        fonts: Vec<BackendFontInfo>,
        page_box: PageBox,
        decoders_built: Cell<usize>,
    }

    impl MockBackend {
        fn new(ops: Vec<ContentOp>) -> Self {
            Self {
                ops,
                fonts: vec![
                    BackendFontInfo {
                        name: b"F1".to_vec(),
                        base_font: "Helvetica".into(),
                        ..Default::default()
                    },
                    BackendFontInfo {
                        name: b"F2".to_vec(),
                        base_font: "Helvetica-Bold".into(),
                        first_char: 65,
                        widths: vec![600.0; 26],
                        ..Default::default()
                    },
                    BackendFontInfo {
                        name: b"F3".to_vec(),
                        base_font: "ABCDEF+Calibri".into(),
                        composite: true,
                        cid_widths: HashMap::from([(0x53, 600.0)]),
                        default_width: 500.0,
                        ..Default::default()
                    },
                ],
                page_box: PageBox::LETTER,
                decoders_built: Cell::new(0),
            }
        }
    }

    impl PdfBackend for MockBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            BTreeMap::from([(1, (1, 0))])
        }
        fn page_box(&self, _page: PageId) -> Result<PageBox> {
            Ok(self.page_box)
        }
        fn page_fonts(&self, _page: PageId) -> Result<Vec<BackendFontInfo>> {
            Ok(self.fonts.clone())
        }
        fn page_content(&self, _page: PageId) -> Result<Vec<u8>> {
            Ok(b"mock".to_vec())
        }
        fn decode_content(&self, _data: &[u8]) -> Result<Vec<ContentOp>> {
            Ok(self.ops.clone())
        }
        fn text_decoder<'a>(&'a self, _page: PageId) -> Box<dyn TextDecoder + 'a> {
            self.decoders_built.set(self.decoders_built.get() + 1);
            Box::new(NoEncodings)
        }
    }

    fn op(name: &str, operands: Vec<PdfValue>) -> ContentOp {
        ContentOp::new(name, operands)
    }

    fn num(v: f32) -> PdfValue {
        PdfValue::Real(v)
    }

    fn s(text: &str) -> PdfValue {
        PdfValue::Str(text.as_bytes().to_vec())
    }

    fn font(name: &str, size: f32) -> ContentOp {
        op("Tf", vec![PdfValue::Name(name.as_bytes().to_vec()), num(size)])
    }

    #[test]
    fn test_tj_produces_positioned_run() {
        let backend = MockBackend::new(vec![
            op("BT", vec![]),
            font("F1", 10.0),
            op("Td", vec![num(72.0), num(700.0)]),
            op("Tj", vec![s("Hello")]),
            op("ET", vec![]),
        ]);
        let record = read_page(&backend, 1, (1, 0)).unwrap();

        assert_eq!(record.viewport_height, 792.0);
        assert_eq!(record.glyph_runs.len(), 1);
        let run = &record.glyph_runs[0];
        assert_eq!(run.text, "Hello");
        assert_eq!(run.font_name, "Helvetica");
        assert_eq!(run.transform.e, 72.0);
        assert_eq!(run.transform.f, 700.0);
        assert_eq!(run.transform.d, 10.0);
        // No widths: 5 glyphs at half an em
        assert!((run.width - 25.0).abs() < 1e-4);
        assert_eq!(record.operators[run.op_index.unwrap()], PaintOp::ShowText);
    }

    #[test]
    fn test_font_widths_drive_advance() {
        let backend = MockBackend::new(vec![
            op("BT", vec![]),
            font("F2", 10.0),
            op("Tm", vec![num(1.0), num(0.0), num(0.0), num(1.0), num(50.0), num(600.0)]),
            op("Tj", vec![s("AB")]),
            op("Tj", vec![s("C")]),
            op("ET", vec![]),
        ]);
        let record = read_page(&backend, 1, (1, 0)).unwrap();
        assert_eq!(record.glyph_runs.len(), 2);
        assert!((record.glyph_runs[0].width - 12.0).abs() < 1e-4);
        // Second run starts where the first ended
        assert!((record.glyph_runs[1].transform.e - 62.0).abs() < 1e-4);
    }

    #[test]
    fn test_tj_array_word_spaces() {
        let backend = MockBackend::new(vec![
            op("BT", vec![]),
            font("F1", 12.0),
            op(
                "TJ",
                vec![PdfValue::Array(vec![
                    s("Built"),
                    PdfValue::Integer(-250),
                    s("system"),
                    PdfValue::Integer(-30),
                    s("s"),
                ])],
            ),
            op("ET", vec![]),
        ]);
        let record = read_page(&backend, 1, (1, 0)).unwrap();
        assert_eq!(record.glyph_runs[0].text, "Built systems");
    }

    #[test]
    fn test_cm_and_media_box_origin() {
        let mut backend = MockBackend::new(vec![
            op("q", vec![]),
            op("cm", vec![num(2.0), num(0.0), num(0.0), num(2.0), num(10.0), num(10.0)]),
            op("BT", vec![]),
            font("F1", 5.0),
            op("Td", vec![num(20.0), num(300.0)]),
            op("Tj", vec![s("scaled")]),
            op("ET", vec![]),
            op("Q", vec![]),
            op("BT", vec![]),
            font("F1", 5.0),
            op("Td", vec![num(20.0), num(300.0)]),
            op("Tj", vec![s("plain")]),
            op("ET", vec![]),
        ]);
        backend.page_box = PageBox {
            llx: 0.0,
            lly: 100.0,
            urx: 612.0,
            ury: 892.0,
        };
        let record = read_page(&backend, 1, (1, 0)).unwrap();

        let scaled = &record.glyph_runs[0].transform;
        assert_eq!(scaled.d, 10.0);
        assert_eq!(scaled.e, 50.0);
        assert_eq!(scaled.f, 510.0);

        let plain = &record.glyph_runs[1].transform;
        assert_eq!(plain.d, 5.0);
        assert_eq!(plain.f, 200.0);
        assert_eq!(record.viewport_height, 792.0);
    }

    #[test]
    fn test_leading_and_next_line() {
        let backend = MockBackend::new(vec![
            op("BT", vec![]),
            font("F1", 10.0),
            op("TD", vec![num(50.0), num(-14.0)]),
            op("Tm", vec![num(1.0), num(0.0), num(0.0), num(1.0), num(50.0), num(700.0)]),
            op("Tj", vec![s("one")]),
            op("T*", vec![]),
            op("Tj", vec![s("two")]),
            op("'", vec![s("three")]),
            op("ET", vec![]),
        ]);
        let record = read_page(&backend, 1, (1, 0)).unwrap();
        let ys: Vec<f32> = record.glyph_runs.iter().map(|r| r.transform.f).collect();
        assert_eq!(ys, vec![700.0, 686.0, 672.0]);
        // One decoder for the page, not one per shown string
        assert_eq!(backend.decoders_built.get(), 1);
    }

    #[test]
    fn test_fill_operators_recorded() {
        let backend = MockBackend::new(vec![
            op("rg", vec![num(1.0), num(0.0), num(0.0)]),
            op("g", vec![num(0.5)]),
            op("k", vec![num(0.0), num(0.0), num(0.0), num(1.0)]),
            op("scn", vec![num(0.0), num(0.0), num(1.0)]),
            op("scn", vec![PdfValue::Name(b"P0".to_vec())]),
            op("re", vec![num(0.0), num(0.0), num(1.0), num(1.0)]),
        ]);
        let record = read_page(&backend, 1, (1, 0)).unwrap();
        assert_eq!(
            record.operators,
            vec![
                PaintOp::SetFillRgb(1.0, 0.0, 0.0),
                PaintOp::SetFillGray(0.5),
                PaintOp::SetFillCmyk(0.0, 0.0, 0.0, 1.0),
                PaintOp::SetFillRgb(0.0, 0.0, 1.0),
                PaintOp::Other("scn".into()),
                PaintOp::Other("re".into()),
            ]
        );
    }

    #[test]
    fn test_whitespace_runs_dropped_but_advance() {
        let backend = MockBackend::new(vec![
            op("BT", vec![]),
            font("F1", 10.0),
            op("Td", vec![num(50.0), num(700.0)]),
            op("Tj", vec![s("  ")]),
            op("Tj", vec![s("x")]),
            op("ET", vec![]),
        ]);
        let record = read_page(&backend, 1, (1, 0)).unwrap();
        assert_eq!(record.glyph_runs.len(), 1);
        assert!((record.glyph_runs[0].transform.e - 60.0).abs() < 1e-4);
    }

    #[test]
    fn test_replayed_page_lays_out_with_colors() {
        let backend = MockBackend::new(vec![
            op("BT", vec![]),
            op("rg", vec![num(0.0), num(0.0), num(1.0)]),
            font("F2", 11.0),
            op("Td", vec![num(50.0), num(700.0)]),
            op("Tj", vec![s("PROJECTS")]),
            op("g", vec![num(0.0)]),
            font("F1", 10.0),
            op("Td", vec![num(0.0), num(-14.0)]),
            op("Tj", vec![s("Compiler work")]),
            op("ET", vec![]),
        ]);
        let record = read_page(&backend, 1, (1, 0)).unwrap();
        let layout = layout_page(&record, &LayoutConfig::default()).unwrap();

        assert_eq!(layout.blocks.len(), 2);
        assert_eq!(layout.blocks[0].color, Rgb::new(0, 0, 255));
        assert_eq!(layout.blocks[0].role, Role::Header);
        assert_eq!(layout.blocks[1].color, Rgb::BLACK);
        assert_eq!(layout.blocks[1].role, Role::Paragraph);
    }

    fn utf16(text: &str) -> PdfValue {
        PdfValue::Str(text.encode_utf16().flat_map(|u| u.to_be_bytes()).collect())
    }

    #[test]
    fn test_composite_font_two_byte_codes() {
        let backend = MockBackend::new(vec![
            op("BT", vec![]),
            font("F3", 10.0),
            op("Tm", vec![num(1.0), num(0.0), num(0.0), num(1.0), num(50.0), num(700.0)]),
            op("Tj", vec![utf16("Senior")]),
            op("Tm", vec![num(1.0), num(0.0), num(0.0), num(1.0), num(86.0), num(700.0)]),
            op("Tj", vec![utf16("Engineer")]),
            op("ET", vec![]),
        ]);
        let record = read_page(&backend, 1, (1, 0)).unwrap();

        assert_eq!(record.glyph_runs[0].text, "Senior");
        // One /W entry for 'S', the rest at /DW
        assert!((record.glyph_runs[0].width - 31.0).abs() < 1e-4);

        let layout = layout_page(&record, &LayoutConfig::default()).unwrap();
        assert_eq!(layout.blocks[0].text, "Senior Engineer");
    }

    #[test]
    fn test_spaceless_scripts() {
        assert!(is_spaceless_script_char('中'));
        assert!(is_spaceless_script_char('あ'));
        assert!(!is_spaceless_script_char('한'));
        assert!(!is_spaceless_script_char('a'));
    }
}
