mod highlight;
mod markdown;
pub mod terminal;

pub use highlight::Highlighter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpanStyle {
    pub fg: Option<Rgb>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub dim: bool,
}

impl SpanStyle {
    pub const PLAIN: Self = Self {
        fg: None,
        bold: false,
        italic: false,
        underline: false,
        strikethrough: false,
        dim: false,
    };
    pub const fn fg(mut self, color: Rgb) -> Self {
        self.fg = Some(color);
        self
    }
    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
    pub const fn italic(mut self) -> Self {
        self.italic = true;
        self
    }
    pub const fn dim(mut self) -> Self {
        self.dim = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: SpanStyle,
}

impl Span {
    pub fn new(text: impl Into<String>, style: SpanStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, SpanStyle::PLAIN)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    pub fn new(spans: Vec<Span>) -> Self {
        Self { spans }
    }
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(vec![Span::plain(text)])
    }
    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|span| span.text.is_empty())
    }
    /// Text without styling.
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

/// A highlighted code block the user can copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rendered {
    pub lines: Vec<Line>,
    pub copy_targets: Vec<CodeBlock>,
}

impl Rendered {
    /// Copy target by its 1-based number.
    pub fn copy_target(&self, number: usize) -> Option<&CodeBlock> {
        number.checked_sub(1).and_then(|i| self.copy_targets.get(i))
    }
    #[cfg(test)]
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(Line::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Markdown renderer for post bodies.
pub struct Renderer {
    highlighter: Highlighter,
}

impl Renderer {
    pub fn new(theme: &str) -> Self {
        Self {
            highlighter: Highlighter::new(theme),
        }
    }
    pub fn render(&self, content: &str) -> Rendered {
        markdown::render(content, &self.highlighter)
    }
}

/// Language declared by a fenced block's info string, if any.
pub fn language_tag(info: &str) -> Option<&str> {
    let word = info.trim_start();
    let end = word
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(word.len());
    (end > 0).then(|| &word[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_tag_takes_leading_word() {
        assert_eq!(language_tag("rust"), Some("rust"));
        assert_eq!(language_tag("rust,ignore"), Some("rust"));
        assert_eq!(language_tag(" js title=\"a.js\""), Some("js"));
        assert_eq!(language_tag("c++"), Some("c"));
        assert_eq!(language_tag(""), None);
        assert_eq!(language_tag("{.python}"), None);
    }

    #[test]
    fn copy_targets_are_one_based() {
        let rendered = Rendered {
            lines: vec![],
            copy_targets: vec![CodeBlock {
                language: "sh".to_string(),
                code: "ls".to_string(),
            }],
        };
        assert_eq!(rendered.copy_target(1).map(|c| c.code.as_str()), Some("ls"));
        assert!(rendered.copy_target(0).is_none());
        assert!(rendered.copy_target(2).is_none());
    }
}
