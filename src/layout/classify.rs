//! Line role heuristics.
//!
//! [`classify`] is a pure function over [`LineMetrics`]; the guard clauses are
//! checked in priority order and the first one that holds decides the role.

use super::LayoutConfig;
use crate::model::{Rgb, Role};
use regex::Regex;
use std::sync::OnceLock;

/// Characters that open a bulleted line.
pub const BULLET_GLYPHS: &[char] = &[
    '•', '-', '*', '▪', '◦', '●', '○', '■', '□', '►', '▸', '‣', '–', '—',
];

fn numbered_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:\d+|[A-Za-z]|(?i:[ivxlcdm]+))[.)]\s+").expect("numbered pattern")
    })
}

/// Everything the classifier looks at for one line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineMetrics {
    /// Trimmed line text
    pub text: String,
    pub indent_px: u32,
    pub max_font_size: u32,
    pub avg_font_size: f32,
    /// Dominant item is bold
    pub bold: bool,
    /// Dominant item color
    pub color: Rgb,
    pub starts_with_bullet: bool,
    pub is_numbered: bool,
    /// Has an uppercase letter and no lowercase ones
    pub all_caps: bool,
    pub word_count: usize,
    pub char_count: usize,
}

impl LineMetrics {
    /// Derive text features from `text`; the rest is taken as given.
    pub fn new(
        text: &str,
        indent_px: u32,
        max_font_size: u32,
        avg_font_size: f32,
        bold: bool,
        color: Rgb,
    ) -> Self {
        let text = text.trim();
        Self {
            text: text.to_string(),
            indent_px,
            max_font_size,
            avg_font_size,
            bold,
            color,
            starts_with_bullet: text.starts_with(BULLET_GLYPHS),
            is_numbered: numbered_pattern().is_match(text),
            all_caps: is_all_caps(text),
            word_count: text.split_whitespace().count(),
            char_count: text.chars().count(),
        }
    }

    /// All caps and no more than `max_words` words, e.g. `SKILLS` or `WORK HISTORY`.
    pub fn is_short_caps_phrase(&self, max_words: usize) -> bool {
        self.all_caps && self.word_count <= max_words
    }
}

/// Decide the role of a line.
pub fn classify(m: &LineMetrics, config: &LayoutConfig) -> Role {
    if m.starts_with_bullet {
        return Role::Bullet;
    }
    if m.indent_px > config.bullet_indent_px
        && m.char_count > config.bullet_min_chars
        && !m.is_numbered
        && !m.is_short_caps_phrase(config.short_caps_max_words)
    {
        return Role::Bullet;
    }

    if m.is_numbered {
        return Role::Numbered;
    }

    if (m.all_caps && m.max_font_size > config.header_caps_size)
        || (m.bold && m.max_font_size > config.header_bold_size)
        || (m.bold && !m.color.is_black())
    {
        return Role::Header;
    }

    if m.bold && m.max_font_size >= config.sub_header_size {
        return Role::SubHeader;
    }

    Role::Paragraph
}

/// Text with a leading bullet glyph and the whitespace after it removed.
pub fn strip_bullet(text: &str) -> &str {
    let text = text.trim_start();
    match text.strip_prefix(BULLET_GLYPHS) {
        Some(rest) => rest.trim_start(),
        None => text,
    }
}

fn is_all_caps(text: &str) -> bool {
    text.chars().any(char::is_uppercase) && !text.chars().any(char::is_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(text: &str, indent: u32, size: u32, bold: bool) -> LineMetrics {
        LineMetrics::new(text, indent, size, size as f32, bold, Rgb::BLACK)
    }

    fn role(m: &LineMetrics) -> Role {
        classify(m, &LayoutConfig::default())
    }

    #[test]
    fn test_bullet_glyph_wins_over_everything() {
        for text in ["• Built system", "•x", "- item", "▪ SKILLS", "— dash"] {
            assert_eq!(role(&metrics(text, 0, 30, true)), Role::Bullet, "{text}");
        }
        let colored = LineMetrics::new("• LEAD", 0, 20, 20.0, true, Rgb::new(200, 0, 0));
        assert_eq!(role(&colored), Role::Bullet);
    }

    #[test]
    fn test_indented_text_is_bullet() {
        assert_eq!(role(&metrics("Managed a team", 20, 10, false)), Role::Bullet);
        // Too short
        assert_eq!(role(&metrics("abc", 20, 10, false)), Role::Paragraph);
        // Not far enough in
        assert_eq!(role(&metrics("Managed a team", 15, 10, false)), Role::Paragraph);
        // Short caps phrase stays a heading candidate
        assert_eq!(role(&metrics("WORK HISTORY", 40, 16, false)), Role::Header);
        // Numbered lines are not bullets
        assert_eq!(role(&metrics("1. First step", 40, 10, false)), Role::Numbered);
    }

    #[test]
    fn test_numbered_patterns() {
        for text in ["1. One", "12) Twelve", "a. alpha", "B) beta", "iv. four", "XII. twelve"] {
            assert_eq!(role(&metrics(text, 0, 10, false)), Role::Numbered, "{text}");
        }
        for text in ["1.5 million", "2024", "A.B. Smith", "v1.2 shipped"] {
            assert_ne!(role(&metrics(text, 0, 10, false)), Role::Numbered, "{text}");
        }
    }

    #[test]
    fn test_header_rules() {
        assert_eq!(role(&metrics("EXPERIENCE", 0, 18, true)), Role::Header);
        assert_eq!(role(&metrics("EXPERIENCE", 0, 15, false)), Role::Header);
        assert_eq!(role(&metrics("EXPERIENCE", 0, 14, false)), Role::Paragraph);
        assert_eq!(role(&metrics("Summary", 0, 17, true)), Role::Header);

        let blue = LineMetrics::new("Projects", 0, 11, 11.0, true, Rgb::new(0, 0, 255));
        assert_eq!(role(&blue), Role::Header);
        let blue_regular = LineMetrics::new("Projects", 0, 11, 11.0, false, Rgb::new(0, 0, 255));
        assert_eq!(role(&blue_regular), Role::Paragraph);
    }

    #[test]
    fn test_sub_header() {
        assert_eq!(role(&metrics("Acme Corp", 0, 12, true)), Role::SubHeader);
        assert_eq!(role(&metrics("Acme Corp", 0, 16, true)), Role::SubHeader);
        assert_eq!(role(&metrics("Acme Corp", 0, 11, true)), Role::Paragraph);
    }

    #[test]
    fn test_all_caps_needs_a_letter() {
        assert!(metrics("ABC 123", 0, 10, false).all_caps);
        assert!(!metrics("2020 - 2024", 0, 10, false).all_caps);
        assert!(!metrics("Abc", 0, 10, false).all_caps);
    }

    #[test]
    fn test_strip_bullet() {
        assert_eq!(strip_bullet("•  Built system"), "Built system");
        assert_eq!(strip_bullet("- item"), "item");
        assert_eq!(strip_bullet("Plain"), "Plain");
    }

    #[test]
    fn test_metrics_trim_text() {
        let m = metrics("   hello world  ", 0, 10, false);
        assert_eq!(m.text, "hello world");
        assert_eq!(m.word_count, 2);
        assert_eq!(m.char_count, 11);
    }
}
