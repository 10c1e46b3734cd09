use std::{
    io::{stdin, BufRead, Write},
    sync::Arc,
    thread,
};

use chrono::Utc;
use log::{debug, info, warn};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    api::PostApi,
    command::{self, Action, FieldBuffer, HELP},
    config::Config,
    error::Result,
    post::Post,
    render::{terminal::LinePrinter, Renderer},
    services::{History, TerminalClipboard, TerminalNotifier},
    view::{copy_from_screen, FetchTicket, PostView, Rejected, RenderContext, Screen},
};

struct PendingFetch {
    ticket: FetchTicket,
    handle: JoinHandle<Result<Option<Post>>>,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Description,
    Content,
}

enum Input {
    Fetched(FetchTicket, Result<Option<Post>>),
    Line(Option<String>),
    Interrupt,
}

/// Read stdin on its own thread so a blocked read never holds up shutdown.
///
/// The channel closes at end of input; the thread exits once the receiver is gone.
pub fn stdin_lines() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    thread::spawn(move || {
        for line in stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("Cannot read input: {}", e);
                    break;
                }
            };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
        debug!("Input closed");
    });
    rx
}

/// Interactive terminal session around one [`PostView`].
pub struct Session<W: Write> {
    api: Arc<dyn PostApi>,
    view: PostView,
    history: History,
    renderer: Renderer,
    media_url: String,
    printer: LinePrinter,
    notifier: TerminalNotifier,
    clipboard: TerminalClipboard,
    fetch: Option<PendingFetch>,
    field: Option<(Field, FieldBuffer)>,
    out: W,
}

impl<W: Write> Session<W> {
    pub fn new(config: &Config, api: Arc<dyn PostApi>, out: W) -> Self {
        Self {
            api,
            view: PostView::new(config.slug(), config.id_field()),
            history: History::new(config.slug()),
            renderer: Renderer::new(config.theme()),
            media_url: config.media_url().to_string(),
            printer: LinePrinter::new(config.color()),
            notifier: TerminalNotifier::new(config.color()),
            clipboard: TerminalClipboard,
            fetch: None,
            field: None,
            out,
        }
    }

    pub async fn run(&mut self, mut lines: mpsc::Receiver<String>) -> Result<()> {
        let slug = self.view.slug().to_string();
        self.open(slug);
        self.show()?;
        info!("Type `help` for commands");

        loop {
            let input = tokio::select! {
                (ticket, result) = wait(&mut self.fetch) => Input::Fetched(ticket, result),
                line = lines.recv() => Input::Line(line),
                _ = tokio::signal::ctrl_c() => Input::Interrupt,
            };

            let keep_going = match input {
                Input::Fetched(ticket, result) => {
                    self.fetched(ticket, result)?;
                    true
                }
                Input::Line(Some(line)) => self.input(&line).await?,
                Input::Line(None) | Input::Interrupt => false,
            };
            if !keep_going {
                break;
            }
        }

        self.cancel_fetch();
        Ok(())
    }

    /// Handle one line of input; `false` ends the session.
    async fn input(&mut self, line: &str) -> Result<bool> {
        if let Some((field, buffer)) = self.field.as_mut() {
            if let Some(text) = buffer.push(line) {
                let field = *field;
                self.field = None;
                let result = match field {
                    Field::Description => self.view.set_description(text),
                    Field::Content => self.view.set_content(text),
                };
                if let Err(e) = result {
                    warn!("{}", e);
                }
                self.show()?;
            }
            return Ok(true);
        }

        let action = match command::parse(line) {
            None => return Ok(true),
            Some(Ok(action)) => action,
            Some(Err(e)) => {
                warn!("{}", e);
                return Ok(true);
            }
        };
        debug!("{:?}", action);

        match action {
            Action::Edit => self.apply(|view| view.edit())?,
            Action::Title(title) => self.apply(|view| view.set_title(title))?,
            Action::Description => self.begin_field(Field::Description),
            Action::Content => self.begin_field(Field::Content),
            Action::Save => {
                match self.view.save(self.api.as_ref(), &self.notifier).await {
                    Ok(()) => self.show()?,
                    Err(e) => warn!("{}", e),
                }
            }
            Action::Cancel => self.apply(|view| view.cancel())?,
            Action::Copy(number) => {
                let screen = self.screen();
                if let Err(e) = copy_from_screen(&screen, number, &self.clipboard, &self.notifier) {
                    warn!("{}", e);
                }
            }
            Action::Open(slug) => {
                self.history.visit(slug.clone());
                self.open(slug);
                self.show()?;
            }
            Action::Back => {
                self.view.back(&mut self.history);
                match self.history.current() {
                    Some(slug) => {
                        let slug = slug.to_string();
                        self.open(slug);
                        self.show()?;
                    }
                    None => return Ok(false),
                }
            }
            Action::Reload => {
                let slug = self.view.slug().to_string();
                self.open(slug);
                self.show()?;
            }
            Action::Show => self.show()?,
            Action::Help => writeln!(self.out, "{}", HELP)?,
            Action::Quit => return Ok(false),
        }
        Ok(true)
    }

    fn apply<F>(&mut self, action: F) -> Result<()>
    where
        F: FnOnce(&mut PostView) -> std::result::Result<(), Rejected>,
    {
        match action(&mut self.view) {
            Ok(()) => self.show(),
            Err(e) => {
                warn!("{}", e);
                Ok(())
            }
        }
    }

    fn begin_field(&mut self, field: Field) {
        if !self.view.is_editing() {
            warn!("{}", Rejected::NotEditing);
            return;
        }
        let name = match field {
            Field::Description => "description",
            Field::Content => "content",
        };
        info!("Type the {}, end with a line holding only `{}`", name, command::END_OF_FIELD);
        self.field = Some((field, FieldBuffer::default()));
    }

    fn fetched(&mut self, ticket: FetchTicket, result: Result<Option<Post>>) -> Result<()> {
        self.fetch = None;
        self.view.apply_fetch(ticket, result);
        self.show()
    }

    /// Start fetching `slug`, abandoning any fetch still in flight.
    fn open(&mut self, slug: String) {
        self.cancel_fetch();
        let ticket = self.view.begin_fetch(slug.clone());
        let api = Arc::clone(&self.api);
        let handle = tokio::spawn(async move { api.get_post_by_slug(&slug).await });
        self.fetch = Some(PendingFetch { ticket, handle });
    }

    fn cancel_fetch(&mut self) {
        if let Some(pending) = self.fetch.take() {
            debug!("Aborting fetch");
            pending.handle.abort();
        }
    }

    fn screen(&self) -> Screen {
        self.view.render(&RenderContext {
            renderer: &self.renderer,
            media_url: &self.media_url,
            now: Utc::now(),
        })
    }

    fn show(&mut self) -> Result<()> {
        let lines = self.screen().lines();
        writeln!(self.out)?;
        self.printer.write_lines(&mut self.out, &lines)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Resolves with the in-flight fetch, or never when there is none.
async fn wait(fetch: &mut Option<PendingFetch>) -> (FetchTicket, Result<Option<Post>>) {
    match fetch {
        Some(pending) => {
            let result = match (&mut pending.handle).await {
                Ok(result) => result,
                Err(e) => Err(e.into()),
            };
            (pending.ticket, result)
        }
        None => std::future::pending().await,
    }
}
