use log::{debug, warn};
use syntect::{
    easy::HighlightLines,
    highlighting::{Theme, ThemeSet},
    parsing::SyntaxSet,
    util::LinesWithEndings,
};

use super::{Line, Rgb, Span, SpanStyle};

const DEFAULT_THEME: &str = "base16-ocean.dark";

pub struct Highlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    pub fn new(theme: &str) -> Self {
        let mut themes = ThemeSet::load_defaults().themes;
        let theme = match themes.remove(theme) {
            Some(theme) => theme,
            None => {
                warn!("Unknown theme `{}`, using {}", theme, DEFAULT_THEME);
                themes.remove(DEFAULT_THEME).unwrap_or_default()
            }
        };

        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme,
        }
    }

    /// Highlight `code` as `language`, one line per source line.
    pub fn highlight(&self, language: &str, code: &str) -> Vec<Line> {
        let syntax = self
            .syntaxes
            .find_syntax_by_token(language)
            .unwrap_or_else(|| {
                debug!("No syntax for `{}`", language);
                self.syntaxes.find_syntax_plain_text()
            });
        let mut lines = HighlightLines::new(syntax, &self.theme);

        LinesWithEndings::from(code)
            .map(|source| match lines.highlight_line(source, &self.syntaxes) {
                Ok(ranges) => Line::new(
                    ranges
                        .into_iter()
                        .map(|(style, text)| {
                            let color = style.foreground;
                            Span::new(
                                text.trim_end_matches('\n'),
                                SpanStyle::PLAIN.fg(Rgb(color.r, color.g, color.b)),
                            )
                        })
                        .filter(|span| !span.text.is_empty())
                        .collect(),
                ),
                Err(e) => {
                    debug!("Highlighting failed: {}", e);
                    Line::plain(source.trim_end_matches('\n'))
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_source_text() {
        let highlighter = Highlighter::new(DEFAULT_THEME);
        let lines = highlighter.highlight("rust", "fn main() {\n    println!(\"hi\");\n}");
        let text: Vec<String> = lines.iter().map(Line::text).collect();
        assert_eq!(text, vec!["fn main() {", "    println!(\"hi\");", "}"]);
        assert!(lines[0].spans.iter().all(|span| span.style.fg.is_some()));
    }

    #[test]
    fn unknown_language_and_theme_fall_back() {
        let highlighter = Highlighter::new("no-such-theme");
        let lines = highlighter.highlight("klingon", "qapla'");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text(), "qapla'");
    }
}
