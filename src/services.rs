use std::io::{stderr, stdout, IsTerminal, Write};

use crossterm::{clipboard::CopyToClipboard, execute, style::Stylize};
use log::debug;

use crate::error::{Error, Result};

/// Transient user-facing notices.
pub trait Notifier {
    fn success(&self, message: &str);
    fn failure(&self, message: &str);
}

pub trait Clipboard {
    fn copy(&self, text: &str) -> Result<()>;
}

pub trait Navigator {
    /// Leave the current screen for the previous one.
    fn back(&mut self);
}

#[derive(Debug, Clone, Copy)]
pub struct TerminalNotifier {
    color: bool,
}

impl TerminalNotifier {
    pub fn new(color: bool) -> Self {
        Self { color }
    }
    fn print(&self, line: String) {
        let mut err = stderr();
        writeln!(err, "{}", line).ok();
    }
}

impl Notifier for TerminalNotifier {
    fn success(&self, message: &str) {
        if self.color {
            self.print(format!("{} {}", "✔".green().bold(), message.green()));
        } else {
            self.print(format!("[ok] {}", message));
        }
    }
    fn failure(&self, message: &str) {
        if self.color {
            self.print(format!("{} {}", "✖".red().bold(), message.red()));
        } else {
            self.print(format!("[error] {}", message));
        }
    }
}

/// Writes to the system clipboard through the terminal (OSC 52).
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalClipboard;

impl Clipboard for TerminalClipboard {
    fn copy(&self, text: &str) -> Result<()> {
        let mut out = stdout();
        if !out.is_terminal() {
            return Err(Error::Clipboard("stdout is not a terminal".to_string()));
        }
        debug!("Copying {} bytes", text.len());
        execute!(out, CopyToClipboard::to_clipboard_from(text))
            .map_err(|e| Error::Clipboard(e.to_string()))
    }
}

/// Slugs visited in this session, most recent last.
#[derive(Debug, Clone, Default)]
pub struct History {
    stack: Vec<String>,
}

impl History {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            stack: vec![slug.into()],
        }
    }
    pub fn visit(&mut self, slug: impl Into<String>) {
        self.stack.push(slug.into());
    }
    pub fn current(&self) -> Option<&str> {
        self.stack.last().map(String::as_str)
    }
}

impl Navigator for History {
    fn back(&mut self) {
        self.stack.pop();
    }
}
