use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use super::{language_tag, CodeBlock, Highlighter, Line, Rendered, Rgb, Span, SpanStyle};

const HEADING: Rgb = Rgb(189, 147, 249);
const LINK: Rgb = Rgb(139, 233, 253);
const CODE: Rgb = Rgb(241, 250, 140);
const MUTED: Rgb = Rgb(98, 114, 164);
const RULE_WIDTH: usize = 40;

pub fn render(content: &str, highlighter: &Highlighter) -> Rendered {
    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut writer = Writer::new(highlighter);
    for event in Parser::new_ext(content, options) {
        writer.event(event);
    }
    writer.finish()
}

#[derive(Debug, Clone, Copy)]
enum Modifier {
    Emphasis,
    Strong,
    Strikethrough,
    Link,
    Heading,
}

struct PendingCode {
    language: Option<String>,
    text: String,
}

#[derive(Default)]
struct Table {
    rows: Vec<Vec<String>>,
    head_rows: usize,
    row: Vec<String>,
    cell: String,
}

struct Writer<'a> {
    highlighter: &'a Highlighter,
    out: Rendered,
    current: Vec<Span>,
    modifiers: Vec<Modifier>,
    /// Next number per open list, `None` for bullets.
    lists: Vec<Option<u64>>,
    marker: Option<String>,
    quote: usize,
    links: Vec<String>,
    images: Vec<String>,
    code: Option<PendingCode>,
    table: Option<Table>,
}

impl<'a> Writer<'a> {
    fn new(highlighter: &'a Highlighter) -> Self {
        Self {
            highlighter,
            out: Rendered::default(),
            current: vec![],
            modifiers: vec![],
            lists: vec![],
            marker: None,
            quote: 0,
            links: vec![],
            images: vec![],
            code: None,
            table: None,
        }
    }

    fn finish(mut self) -> Rendered {
        self.flush();
        while self.out.lines.last().is_some_and(Line::is_empty) {
            self.out.lines.pop();
        }
        self.out
    }

    fn event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                if let Some(table) = self.table.as_mut() {
                    table.cell.push_str(&code);
                } else {
                    self.current.push(Span::new(code.to_string(), SpanStyle::PLAIN.fg(CODE)));
                }
            }
            Event::Html(html) => {
                self.flush();
                for line in html.lines() {
                    self.push_line(vec![Span::plain(line)]);
                }
            }
            Event::InlineHtml(html) => self.text(&html),
            Event::SoftBreak => self.text(" "),
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                let rule = "─".repeat(RULE_WIDTH);
                self.push_line(vec![Span::new(rule, SpanStyle::PLAIN.fg(MUTED))]);
                self.blank();
            }
            Event::TaskListMarker(checked) => {
                self.current
                    .push(Span::plain(if checked { "[x] " } else { "[ ] " }));
            }
            Event::FootnoteReference(label) => self.text(&format!("[^{}]", label)),
        }
    }

    fn start(&mut self, tag: Tag) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush();
                self.modifiers.push(Modifier::Heading);
                let marks = "#".repeat(heading_depth(level));
                let style = self.style();
                self.current.push(Span::new(format!("{} ", marks), style));
            }
            Tag::BlockQuote => {
                self.flush();
                self.quote += 1;
            }
            Tag::CodeBlock(kind) => {
                self.flush();
                let language = match kind {
                    CodeBlockKind::Fenced(info) => language_tag(&info).map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                self.code = Some(PendingCode {
                    language,
                    text: String::new(),
                });
            }
            Tag::HtmlBlock => self.flush(),
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let marker = match self.lists.last_mut() {
                    Some(Some(number)) => {
                        let marker = format!("{}. ", number);
                        *number += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.marker = Some(marker);
            }
            Tag::Emphasis => self.modifiers.push(Modifier::Emphasis),
            Tag::Strong => self.modifiers.push(Modifier::Strong),
            Tag::Strikethrough => self.modifiers.push(Modifier::Strikethrough),
            Tag::Link { dest_url, .. } => {
                self.modifiers.push(Modifier::Link);
                self.links.push(dest_url.to_string());
            }
            Tag::Image { dest_url, .. } => {
                self.images.push(dest_url.to_string());
                self.current
                    .push(Span::new("[image: ", SpanStyle::PLAIN.fg(MUTED)));
            }
            Tag::Table(_) => {
                self.flush();
                self.table = Some(Table::default());
            }
            Tag::TableHead | Tag::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    table.row.clear();
                }
            }
            Tag::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    table.cell.clear();
                }
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::Heading(_) => {
                self.modifiers.pop();
                self.flush();
                self.blank();
            }
            TagEnd::BlockQuote => {
                self.flush();
                self.quote = self.quote.saturating_sub(1);
                self.blank();
            }
            TagEnd::CodeBlock => {
                if let Some(code) = self.code.take() {
                    self.code_block(code);
                }
            }
            TagEnd::HtmlBlock => self.blank(),
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::Item => self.flush(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.modifiers.pop();
            }
            TagEnd::Link => {
                self.modifiers.pop();
                if let Some(url) = self.links.pop() {
                    self.current
                        .push(Span::new(format!(" ({})", url), SpanStyle::PLAIN.fg(MUTED)));
                }
            }
            TagEnd::Image => {
                if let Some(url) = self.images.pop() {
                    self.current
                        .push(Span::new(format!("] ({})", url), SpanStyle::PLAIN.fg(MUTED)));
                }
            }
            TagEnd::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    let cell = std::mem::take(&mut table.cell);
                    table.row.push(cell.trim().to_string());
                }
            }
            TagEnd::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                    table.head_rows = table.rows.len();
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    self.table_lines(table);
                }
                self.blank();
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(code) = self.code.as_mut() {
            code.text.push_str(text);
        } else if let Some(table) = self.table.as_mut() {
            table.cell.push_str(text);
        } else {
            let style = self.style();
            self.current.push(Span::new(text, style));
        }
    }

    fn code_block(&mut self, code: PendingCode) {
        let text = code.text.strip_suffix('\n').unwrap_or(&code.text).to_string();

        match code.language {
            Some(language) => {
                let number = self.out.copy_targets.len() + 1;
                self.push_line(vec![
                    Span::new(format!("[copy {}]", number), SpanStyle::PLAIN.fg(LINK).bold()),
                    Span::new(format!(" {}", language), SpanStyle::PLAIN.fg(MUTED)),
                ]);
                for line in self.highlighter.highlight(&language, &text) {
                    let mut spans = vec![Span::new("  │ ", SpanStyle::PLAIN.fg(MUTED))];
                    spans.extend(line.spans);
                    self.push_line(spans);
                }
                self.out.copy_targets.push(CodeBlock {
                    language,
                    code: text,
                });
            }
            None => {
                for line in text.lines() {
                    let indented = format!("    {}", line);
                    self.push_line(vec![Span::new(indented, SpanStyle::PLAIN.fg(CODE))]);
                }
            }
        }
        self.blank();
    }

    fn table_lines(&mut self, table: Table) {
        let columns = table.rows.iter().map(Vec::len).max().unwrap_or(0);
        let widths: Vec<usize> = (0..columns)
            .map(|i| {
                table
                    .rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        for (index, row) in table.rows.iter().enumerate() {
            let cells: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(i, width)| {
                    let cell = row.get(i).map(String::as_str).unwrap_or("");
                    format!("{:width$}", cell, width = width)
                })
                .collect();
            let style = if index < table.head_rows {
                SpanStyle::PLAIN.bold()
            } else {
                SpanStyle::PLAIN
            };
            self.push_line(vec![Span::new(format!("| {} |", cells.join(" | ")), style)]);

            if index + 1 == table.head_rows {
                let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
                self.push_line(vec![Span::new(
                    format!("|-{}-|", rule.join("-|-")),
                    SpanStyle::PLAIN.fg(MUTED),
                )]);
            }
        }
    }

    fn style(&self) -> SpanStyle {
        self.modifiers
            .iter()
            .fold(SpanStyle::PLAIN, |mut style, modifier| {
                match modifier {
                    Modifier::Emphasis => style.italic = true,
                    Modifier::Strong => style.bold = true,
                    Modifier::Strikethrough => style.strikethrough = true,
                    Modifier::Link => {
                        style.underline = true;
                        style.fg = Some(LINK);
                    }
                    Modifier::Heading => {
                        style.bold = true;
                        style.fg = Some(HEADING);
                    }
                }
                style
            })
    }

    /// Quote bars and list indentation for the next line.
    fn prefix(&mut self) -> Vec<Span> {
        let mut prefix = vec![];
        if self.quote > 0 {
            prefix.push(Span::new("│ ".repeat(self.quote), SpanStyle::PLAIN.fg(MUTED)));
        }
        if !self.lists.is_empty() {
            let depth = self.lists.len() - 1;
            let marker = match self.marker.take() {
                Some(marker) => marker,
                None => "  ".to_string(),
            };
            prefix.push(Span::plain(format!("{}{}", "  ".repeat(depth), marker)));
        }
        prefix
    }

    fn push_line(&mut self, spans: Vec<Span>) {
        let mut line = self.prefix();
        line.extend(spans);
        self.out.lines.push(Line::new(line));
    }

    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.current);
        self.push_line(spans);
    }

    fn blank(&mut self) {
        if self.out.lines.last().is_some_and(|line| !line.is_empty()) {
            self.out.lines.push(Line::default());
        }
    }
}

fn heading_depth(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_text(content: &str) -> Rendered {
        render(content, &Highlighter::new("base16-ocean.dark"))
    }

    #[test]
    fn tagged_fence_is_copy_target() {
        let rendered = render_text("Intro\n\n```rust\nfn main() {}\n```\n");

        assert_eq!(rendered.copy_targets.len(), 1);
        assert_eq!(rendered.copy_targets[0].language, "rust");
        assert_eq!(rendered.copy_targets[0].code, "fn main() {}");

        let text = rendered.text();
        assert!(text.contains("[copy 1] rust"));
        assert!(text.contains("fn main() {}"));
    }

    #[test]
    fn untagged_code_has_no_copy_control() {
        let rendered = render_text("Use `cargo` here.\n\n```\nplain block\n```\n\n    indented\n");

        assert!(rendered.copy_targets.is_empty());
        let text = rendered.text();
        assert!(!text.contains("[copy"));
        assert!(text.contains("Use cargo here."));
        assert!(text.contains("    plain block"));
        assert!(text.contains("    indented"));
    }

    #[test]
    fn copy_text_drops_only_one_trailing_newline() {
        let rendered = render_text("```sh\necho a\n\necho b\n\n```\n");
        assert_eq!(rendered.copy_targets[0].code, "echo a\n\necho b\n");
    }

    #[test]
    fn numbers_copy_targets_in_order() {
        let rendered = render_text("```js\na()\n```\n\n```\nskip\n```\n\n```python\nb()\n```\n");
        let languages: Vec<&str> = rendered
            .copy_targets
            .iter()
            .map(|block| block.language.as_str())
            .collect();
        assert_eq!(languages, vec!["js", "python"]);
        assert!(rendered.text().contains("[copy 2] python"));
    }

    #[test]
    fn gfm_extensions() {
        let rendered = render_text(
            "| a | bb |\n|---|----|\n| 1 | 2 |\n\n~~gone~~\n\n- [x] done\n- [ ] todo\n",
        );
        let text = rendered.text();
        assert!(text.contains("| a | bb |"));
        assert!(text.contains("| 1 | 2  |"));
        assert!(text.contains("• [x] done"));
        assert!(text.contains("• [ ] todo"));

        let struck = rendered
            .lines
            .iter()
            .flat_map(|line| line.spans.iter())
            .find(|span| span.text == "gone")
            .unwrap();
        assert!(struck.style.strikethrough);
    }

    #[test]
    fn raw_html_passes_through() {
        let rendered =
            render_text("<div class=\"note\">\nhello\n</div>\n\ntext with <kbd>Ctrl</kbd>\n");
        let text = rendered.text();
        assert!(text.contains("<div class=\"note\">"));
        assert!(text.contains("</div>"));
        assert!(text.contains("text with <kbd>Ctrl</kbd>"));
    }

    #[test]
    fn headings_lists_links_and_quotes() {
        let rendered = render_text(
            "## Title\n\n1. one\n2. two\n   - nested\n\n> quoted\n\n[site](https://example.com)\n",
        );
        let lines: Vec<String> = rendered.lines.iter().map(Line::text).collect();
        assert_eq!(lines[0], "## Title");
        assert!(lines.contains(&"1. one".to_string()));
        assert!(lines.contains(&"2. two".to_string()));
        assert!(lines.contains(&"  • nested".to_string()));
        assert!(lines.contains(&"│ quoted".to_string()));
        assert!(lines.contains(&"site (https://example.com)".to_string()));
        assert!(rendered.lines[0].spans.iter().all(|span| span.style.bold));
    }
}
