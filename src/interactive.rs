//! Line-driven session: requests run concurrently on the current task while
//! commands keep being read, and only the latest request may land.

use anyhow::{Context, Result};
use futures_util::FutureExt;
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::error::LyricsError;
use crate::render::{self, RenderOptions};
use crate::scroll::{PaneSide, ScrollPane, ScrollSynchronizer};
use crate::service::{LyricsService, TranslateRequest, TranslationPayload};
use crate::session::{Accepted, RequestTicket, Session};
use crate::settings::Settings;
use crate::{Config, build_service, render_options, resolve_settings};

const HELP: &str = "\
Commands:
  /quit, /exit                 Exit interactive mode (also while collecting /text)
  /help                        Show this list
  /search <artist> - <title>   Look up a song and translate it
  /text [line]                 Translate a line, or the lines up to a lone '.'
  /lang <source> <target>      Set the language pair
  /scroll <source|target> <n>  Scroll one pane to row n (the other follows)
  /show                        Show the current panes
  /status                      Show the request state
  /clear                       Drop the result and any error";

pub async fn run(config: Config) -> Result<()> {
    let settings = resolve_settings(&config)?;
    let service = build_service(&settings)?;
    let options = render_options(&config, &settings);
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    writeln!(stdout, "Interactive mode. Type /help for commands.")?;
    run_loop(&service, &settings, options, stdin, &mut stdout).await
}

pub async fn run_loop<S, R, W>(
    service: &S,
    settings: &Settings,
    options: RenderOptions,
    input: R,
    out: W,
) -> Result<()>
where
    S: LyricsService,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut repl = Repl::new(settings, options, out);
    let mut lines = input.lines();
    let mut inflight = FuturesUnordered::new();
    let mut input_open = true;

    while input_open || !inflight.is_empty() {
        tokio::select! {
            biased;
            Some((ticket, result)) = inflight.next(), if !inflight.is_empty() => {
                repl.finish(ticket, result)?;
            }
            line = lines.next_line(), if input_open => {
                let Some(line) = line.with_context(|| "failed to read input")? else {
                    input_open = false;
                    continue;
                };
                match repl.handle_line(&line)? {
                    Step::Continue => {}
                    Step::Quit => break,
                    Step::Issue(ticket, request) => {
                        inflight.push(service.translate(request).map(move |result| (ticket, result)));
                    }
                }
            }
            else => break,
        }
    }
    Ok(())
}

enum Step {
    Continue,
    Quit,
    Issue(RequestTicket, TranslateRequest),
}

/// Terminal stand-in for a scrollable column, in whole rows.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalPane {
    offset: f32,
    max_offset: f32,
}

impl TerminalPane {
    pub fn new(rows: usize, viewport_rows: usize) -> Self {
        Self {
            offset: 0.0,
            max_offset: rows.saturating_sub(viewport_rows) as f32,
        }
    }

    pub fn first_row(&self) -> usize {
        self.offset.max(0.0) as usize
    }
}

impl ScrollPane for TerminalPane {
    fn scroll_offset(&self) -> f32 {
        self.offset
    }

    fn set_scroll_offset(&mut self, offset: f32) {
        self.offset = offset.clamp(0.0, self.max_offset).floor();
    }
}

type PanePair = (Rc<RefCell<TerminalPane>>, Rc<RefCell<TerminalPane>>);

struct Repl<W: Write> {
    session: Session,
    sync: ScrollSynchronizer<TerminalPane>,
    panes: Option<PanePair>,
    collecting: Option<Vec<String>>,
    source_language: String,
    target_language: String,
    viewport_rows: usize,
    options: RenderOptions,
    out: W,
}

impl<W: Write> Repl<W> {
    fn new(settings: &Settings, options: RenderOptions, out: W) -> Self {
        Self {
            session: Session::new(),
            sync: ScrollSynchronizer::new(),
            panes: None,
            collecting: None,
            source_language: settings.source_language.clone(),
            target_language: settings.target_language.clone(),
            viewport_rows: settings.viewport_rows.max(1),
            options,
            out,
        }
    }

    fn say(&mut self, text: impl std::fmt::Display) -> Result<()> {
        writeln!(self.out, "{}", text)?;
        Ok(())
    }

    fn handle_line(&mut self, line: &str) -> Result<Step> {
        if let Some(buffer) = self.collecting.as_mut() {
            if matches!(line.trim(), "/quit" | "/exit") {
                return Ok(Step::Quit);
            }
            if line.trim() != "." {
                buffer.push(line.to_string());
                return Ok(Step::Continue);
            }
            let text = self.collecting.take().unwrap_or_default().join("\n");
            return self.issue(TranslateRequest::text(
                text,
                self.source_language.clone(),
                self.target_language.clone(),
            ));
        }

        let input = line.trim();
        if input.is_empty() {
            return Ok(Step::Continue);
        }
        let (command, rest) = input.split_once(' ').unwrap_or((input, ""));
        let rest = rest.trim();
        match command {
            "/quit" | "/exit" => return Ok(Step::Quit),
            "/help" => self.say(HELP)?,
            "/search" => {
                let (artist, title) = rest.split_once(" - ").unwrap_or((rest, ""));
                return self.issue(TranslateRequest::search(
                    artist.trim(),
                    title.trim(),
                    self.source_language.clone(),
                    self.target_language.clone(),
                ));
            }
            "/text" if rest.is_empty() => self.collecting = Some(Vec::new()),
            "/text" => {
                return self.issue(TranslateRequest::text(
                    rest,
                    self.source_language.clone(),
                    self.target_language.clone(),
                ));
            }
            "/lang" => match rest.split_whitespace().collect::<Vec<_>>().as_slice() {
                [source, target] => {
                    self.source_language = source.to_string();
                    self.target_language = target.to_string();
                    self.say(format!("languages: {} -> {}", source, target))?;
                }
                _ => self.say("usage: /lang <source> <target>")?,
            },
            "/scroll" => self.scroll(rest)?,
            "/show" => self.show()?,
            "/status" => {
                let status = render::render_status(&self.session);
                self.say(status)?;
            }
            "/clear" => {
                self.session.clear();
                self.sync.release();
                self.panes = None;
                self.say("cleared")?;
            }
            _ => self.say(format!("unknown command: {} (try /help)", command))?,
        }
        Ok(Step::Continue)
    }

    fn issue(&mut self, request: TranslateRequest) -> Result<Step> {
        match self.session.begin(&request) {
            Ok(ticket) => {
                self.say(format!("request #{} sent", ticket.seq))?;
                Ok(Step::Issue(ticket, request))
            }
            Err(err) => {
                self.say(format!("Error: {}", err))?;
                Ok(Step::Continue)
            }
        }
    }

    fn finish(
        &mut self,
        ticket: RequestTicket,
        result: Result<TranslationPayload, LyricsError>,
    ) -> Result<()> {
        match self.session.complete(ticket, result) {
            Ok(Accepted::Success { generation }) => {
                self.rebind_panes(generation);
                self.show()
            }
            Ok(Accepted::Error) => {
                let status = render::render_status(&self.session);
                self.say(status)
            }
            Err(err) => {
                debug!("dropped result: {}", err);
                Ok(())
            }
        }
    }

    /// New content means new panes; the old coupling is released by `bind`.
    fn rebind_panes(&mut self, generation: u64) {
        let Some(display) = self.session.display() else {
            return;
        };
        let rows = display.rows.len();
        let source = Rc::new(RefCell::new(TerminalPane::new(rows, self.viewport_rows)));
        let target = Rc::new(RefCell::new(TerminalPane::new(rows, self.viewport_rows)));
        self.sync.bind(&source, &target, generation);
        self.panes = Some((source, target));
    }

    fn scroll(&mut self, args: &str) -> Result<()> {
        let mut parts = args.split_whitespace();
        let side = match parts.next() {
            Some("source") => PaneSide::Source,
            Some("target") => PaneSide::Target,
            _ => return self.say("usage: /scroll <source|target> <row>"),
        };
        let Some(row) = parts.next().and_then(|value| value.parse::<f32>().ok()) else {
            return self.say("usage: /scroll <source|target> <row>");
        };
        let Some((source, target)) = self.panes.as_ref() else {
            return self.say("nothing to scroll");
        };
        let pane = match side {
            PaneSide::Source => source,
            PaneSide::Target => target,
        };
        pane.borrow_mut().set_scroll_offset(row);
        let offset = pane.borrow().scroll_offset();
        let outcome = self.sync.on_scrolled(side, offset);
        debug!(?side, offset, ?outcome, "scrolled pane");
        self.show()
    }

    fn show(&mut self) -> Result<()> {
        let Some(display) = self.session.display() else {
            let status = render::render_status(&self.session);
            return self.say(status);
        };
        let (source_row, target_row) = match &self.panes {
            Some((source, target)) => (source.borrow().first_row(), target.borrow().first_row()),
            None => (0, 0),
        };
        let window = render::render_window(
            display,
            source_row,
            target_row,
            self.viewport_rows,
            &self.options,
        );
        let error = self.session.error_message().map(|message| format!("Error: {}", message));
        self.say(window)?;
        if let Some(error) = error {
            self.say(error)?;
        }
        Ok(())
    }
}
