use std::io::{self, Write};

use crossterm::style::{Attribute, Color, ContentStyle, Stylize};

use super::{Line, Rgb, SpanStyle};

/// Writes styled lines, or bare text when color is off.
#[derive(Debug, Clone, Copy)]
pub struct LinePrinter {
    color: bool,
}

impl LinePrinter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn write_line(&self, out: &mut impl Write, line: &Line) -> io::Result<()> {
        if self.color {
            for span in &line.spans {
                write!(out, "{}", content_style(span.style).apply(&span.text))?;
            }
            writeln!(out)
        } else {
            writeln!(out, "{}", line.text())
        }
    }

    pub fn write_lines<'a>(
        &self,
        out: &mut impl Write,
        lines: impl IntoIterator<Item = &'a Line>,
    ) -> io::Result<()> {
        for line in lines {
            self.write_line(out, line)?;
        }
        Ok(())
    }
}

fn content_style(style: SpanStyle) -> ContentStyle {
    let mut content = ContentStyle::new();
    if let Some(Rgb(r, g, b)) = style.fg {
        content = content.with(Color::Rgb { r, g, b });
    }
    for (enabled, attribute) in [
        (style.bold, Attribute::Bold),
        (style.italic, Attribute::Italic),
        (style.underline, Attribute::Underlined),
        (style.strikethrough, Attribute::CrossedOut),
        (style.dim, Attribute::Dim),
    ] {
        if enabled {
            content = content.attribute(attribute);
        }
    }
    content
}
