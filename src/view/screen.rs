use crate::render::{CodeBlock, Line, Rendered, Rgb, Span, SpanStyle};

const ACCENT: Rgb = Rgb(189, 147, 249);
const CONTROL: Rgb = Rgb(80, 250, 123);
const MUTED: Rgb = Rgb(98, 114, 164);

/// What the view shows for its current state.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Loading,
    Error(String),
    NotFound,
    Edit(EditForm),
    View(PostPage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    pub title: String,
    pub description: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostPage {
    pub title: String,
    pub published: String,
    pub categories: Vec<String>,
    pub cover: Option<CoverImage>,
    pub description: String,
    pub body: Rendered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    pub src: String,
    pub alt: String,
}

impl Screen {
    pub fn copy_target(&self, number: usize) -> Option<&CodeBlock> {
        match self {
            Self::View(page) => page.body.copy_target(number),
            _ => None,
        }
    }

    pub fn lines(&self) -> Vec<Line> {
        match self {
            Self::Loading => vec![Line::new(vec![Span::new("Loading…", SpanStyle::PLAIN.dim())])],
            Self::Error(message) => vec![Line::plain(format!("Error: {}", message))],
            Self::NotFound => vec![Line::plain("No post found.")],
            Self::Edit(form) => form.lines(),
            Self::View(page) => page.lines(),
        }
    }

    #[cfg(test)]
    pub fn text(&self) -> String {
        self.lines()
            .iter()
            .map(Line::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl EditForm {
    fn lines(&self) -> Vec<Line> {
        let label = SpanStyle::PLAIN.fg(ACCENT).bold();
        let mut lines = vec![Line::new(vec![
            Span::new("Title: ", label),
            Span::plain(placeholder(&self.title, "Enter title")),
        ])];

        for (name, value, hint) in [
            ("Description:", &self.description, "Enter description"),
            ("Content:", &self.content, "Enter content"),
        ] {
            lines.push(Line::default());
            lines.push(Line::new(vec![Span::new(name, label)]));
            if value.is_empty() {
                let hint = format!("  {}", hint);
                lines.push(Line::new(vec![Span::new(hint, SpanStyle::PLAIN.dim())]));
            }
            lines.extend(value.lines().map(|line| Line::plain(format!("  {}", line))));
        }

        lines.push(Line::default());
        lines.push(controls(&["save", "cancel"]));
        lines.push(controls(&["back"]));
        lines
    }
}

impl PostPage {
    fn lines(&self) -> Vec<Line> {
        let mut lines = vec![
            Line::new(vec![
                Span::new(self.title.clone(), SpanStyle::PLAIN.fg(ACCENT).bold()),
                Span::plain("  "),
                control("edit"),
            ]),
            Line::new(vec![Span::new(
                format!("Published: {}", self.published),
                SpanStyle::PLAIN.dim(),
            )]),
        ];

        if !self.categories.is_empty() {
            let mut spans = vec![Span::new("Categories: ", SpanStyle::PLAIN.dim())];
            for name in &self.categories {
                spans.push(Span::new(format!("[{}]", name), SpanStyle::PLAIN.fg(ACCENT)));
                spans.push(Span::plain(" "));
            }
            spans.pop();
            lines.push(Line::new(spans));
        }

        if let Some(cover) = &self.cover {
            lines.push(Line::new(vec![
                Span::new("Cover: ", SpanStyle::PLAIN.dim()),
                Span::plain(cover.src.clone()),
                Span::new(format!(" ({})", cover.alt), SpanStyle::PLAIN.fg(MUTED)),
            ]));
        }

        lines.push(Line::default());
        lines.push(Line::new(vec![Span::new(
            self.description.clone(),
            SpanStyle::PLAIN.italic(),
        )]));
        lines.push(Line::default());
        lines.extend(self.body.lines.iter().cloned());
        lines.push(Line::default());
        lines.push(controls(&["back"]));
        lines
    }
}

fn placeholder<'a>(value: &'a str, hint: &'a str) -> &'a str {
    if value.is_empty() {
        hint
    } else {
        value
    }
}

fn control(name: &str) -> Span {
    Span::new(format!("[{}]", name), SpanStyle::PLAIN.fg(CONTROL).bold())
}

fn controls(names: &[&str]) -> Line {
    let mut spans = vec![];
    for name in names {
        if !spans.is_empty() {
            spans.push(Span::plain(" "));
        }
        spans.push(control(name));
    }
    if names == ["back"] {
        spans.push(Span::plain(" Back to Blogs"));
    }
    Line::new(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> PostPage {
        PostPage {
            title: "Hello".to_string(),
            published: "2 days ago".to_string(),
            categories: vec!["rust".to_string(), "web".to_string()],
            cover: Some(CoverImage {
                src: "http://cms/uploads/a.png".to_string(),
                alt: "Hello".to_string(),
            }),
            description: "About things".to_string(),
            body: Rendered {
                lines: vec![Line::plain("body line")],
                copy_targets: vec![],
            },
        }
    }

    #[test]
    fn loading_and_error_show_nothing_else() {
        assert_eq!(Screen::Loading.text(), "Loading…");
        assert_eq!(
            Screen::Error("Error fetching post.".to_string()).text(),
            "Error: Error fetching post."
        );
        assert_eq!(Screen::NotFound.text(), "No post found.");
    }

    #[test]
    fn view_layout() {
        let text = Screen::View(page()).text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Hello  [edit]");
        assert_eq!(lines[1], "Published: 2 days ago");
        assert_eq!(lines[2], "Categories: [rust] [web]");
        assert_eq!(lines[3], "Cover: http://cms/uploads/a.png (Hello)");
        assert!(text.contains("About things"));
        assert!(text.contains("body line"));
        assert!(text.ends_with("[back] Back to Blogs"));
    }

    #[test]
    fn edit_layout_shows_drafts_and_placeholders() {
        let form = EditForm {
            title: "Draft".to_string(),
            description: String::new(),
            content: "one\ntwo".to_string(),
        };
        let text = Screen::Edit(form).text();
        assert!(text.starts_with("Title: Draft"));
        assert!(text.contains("Description:\n  Enter description"));
        assert!(text.contains("Content:\n  one\n  two"));
        assert!(text.contains("[save] [cancel]"));
        assert!(!text.contains("[edit]"));
    }
}
