use thiserror::Error;

/// Line that ends a multi-line field.
pub const END_OF_FIELD: &str = ".";

pub const HELP: &str = "\
edit                 switch to edit mode
title <text>         set the title draft
description          type the description, end with a line holding only `.`
content              type the content, end with a line holding only `.`
save                 save the drafts
cancel               leave edit mode
copy <n>             copy code block n to the clipboard
open <slug>          open another post
back                 return to the previous post
reload               fetch the post again
show                 print the current screen
quit                 exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Edit,
    Title(String),
    Description,
    Content,
    Save,
    Cancel,
    Copy(usize),
    Open(String),
    Back,
    Reload,
    Show,
    Help,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command `{0}`, type `help`")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("`{0}` is not a code block number")]
    BadNumber(String),
}

/// Parse one input line. `None` for blank lines.
pub fn parse(line: &str) -> Option<Result<Action, ParseError>> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    if trimmed.is_empty() {
        return None;
    }

    let (name, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (trimmed, ""),
    };

    let action = match name {
        "edit" | "e" => Ok(Action::Edit),
        "title" | "t" => Ok(Action::Title(rest.to_string())),
        "description" | "d" => Ok(Action::Description),
        "content" => Ok(Action::Content),
        "save" | "s" => Ok(Action::Save),
        "cancel" | "c" => Ok(Action::Cancel),
        "copy" | "y" => match rest {
            "" => Err(ParseError::MissingArgument("copy")),
            n => n
                .parse()
                .map(Action::Copy)
                .map_err(|_| ParseError::BadNumber(n.to_string())),
        },
        "open" | "o" => match rest {
            "" => Err(ParseError::MissingArgument("open")),
            slug => Ok(Action::Open(slug.to_string())),
        },
        "back" | "b" => Ok(Action::Back),
        "reload" | "r" => Ok(Action::Reload),
        "show" | "p" => Ok(Action::Show),
        "help" | "?" => Ok(Action::Help),
        "quit" | "q" | "exit" => Ok(Action::Quit),
        other => Err(ParseError::Unknown(other.to_string())),
    };
    Some(action)
}

/// Collects the lines of a multi-line field.
#[derive(Debug, Clone, Default)]
pub struct FieldBuffer {
    lines: Vec<String>,
}

impl FieldBuffer {
    /// Returns the finished text once the terminator line arrives.
    pub fn push(&mut self, line: &str) -> Option<String> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line == END_OF_FIELD {
            return Some(std::mem::take(&mut self.lines).join("\n"));
        }
        self.lines.push(line.to_string());
        None
    }
}
