//! Rendering options and configuration.

/// Options for serializing a document.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Class of the wrapping HTML container
    pub container_class: String,

    /// Fixed CSS line-height of every block
    pub line_height: f32,

    /// Include YAML frontmatter with metadata (Markdown)
    pub include_frontmatter: bool,

    /// Character to use for unordered list markers (Markdown)
    pub list_marker: char,

    /// Escape special Markdown characters
    pub escape_special_chars: bool,

    /// Reproduce block indentation with leading spaces (plain text)
    pub preserve_indent: bool,

    /// Pixels per leading space when preserving indentation
    pub indent_unit_px: u32,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTML container class.
    pub fn with_container_class(mut self, class: impl Into<String>) -> Self {
        self.container_class = class.into();
        self
    }

    /// Set the CSS line height.
    pub fn with_line_height(mut self, line_height: f32) -> Self {
        self.line_height = line_height;
        self
    }

    /// Enable or disable frontmatter.
    pub fn with_frontmatter(mut self, include: bool) -> Self {
        self.include_frontmatter = include;
        self
    }

    /// Set the list marker character.
    pub fn with_list_marker(mut self, marker: char) -> Self {
        self.list_marker = marker;
        self
    }

    /// Enable or disable Markdown escaping.
    pub fn with_escaping(mut self, escape: bool) -> Self {
        self.escape_special_chars = escape;
        self
    }

    /// Enable or disable indentation in plain text output.
    pub fn with_indent(mut self, preserve: bool) -> Self {
        self.preserve_indent = preserve;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            container_class: "pdf-content".to_string(),
            line_height: 1.2,
            include_frontmatter: false,
            list_marker: '-',
            escape_special_chars: true,
            preserve_indent: true,
            indent_unit_px: 8,
        }
    }
}
