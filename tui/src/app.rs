//! Interactive Session
//!
//! [`SessionController`] runs the lookup session on a [`ScreenSurface`]:
//! - reads one key at a time and processes it to completion
//! - keeps the input buffer and echoes it on the input line
//! - runs lookups synchronously through the [`Dictionary`]
//! - shows results a page at a time in a [`TextArea`]
//! - keeps a status bar of short labelled messages
//!
//! # Screen layout
//!
//! ```text
//! row 0      ┌─────────────────────────┐
//!            │ text area (results)     │
//! row h-3    │                         │
//! row h-2    │ > input                 │
//! row h-1    │ status | status         │
//!            └─────────────────────────┘
//! ```
//!
//! # States
//!
//! `Idle` accepts input. `Blocked` covers the time a lookup is running and
//! rejects every key. `Exited` is final; nothing is drawn after it.

use std::collections::BTreeMap;
use std::io;

use thiserror::Error;
use tracing::{debug, info, warn};
use unicode_width::UnicodeWidthChar;

use define_core::{format_entries, DefineConfig, Dictionary, DisplayOptions, Resolver};

use crate::markup::{SpanStyle, StyledSpan};
use crate::screen::{Key, ScreenSurface};
use crate::widgets::{LayoutError, TextArea};

/// Shown before the input buffer
const PROMPT: &str = "> ";

/// Input line plus status bar
const CHROME_ROWS: u16 = 2;

const HELP_TEXT: &str = "Type a word and press Enter | PgUp/PgDn: pages | Esc: quit";

const STATUS_SEPARATOR: &str = " | ";

/// Status bar labels, rendered in this (sorted) order
pub mod status {
    pub const HELP: &str = "help";
    pub const INPUT: &str = "input";
    pub const KEY: &str = "key";
    pub const LOOKUP: &str = "lookup";
    pub const PAGE: &str = "page";
}

/// Errors that end the session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("surface error: {0}")]
    Surface(#[from] io::Error),
}

/// Lifecycle of the session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for input
    Idle,
    /// A lookup is running
    Blocked,
    /// Finished
    Exited,
}

/// The interactive lookup session
pub struct SessionController<S: ScreenSurface, R: Resolver> {
    surface: S,
    dictionary: Dictionary<R>,
    display: DisplayOptions,

    // === Session State ===
    state: SessionState,
    /// Typed word, ASCII letters only
    input: String,
    /// Longest word accepted
    max_input: usize,
    /// Status messages by label
    statuses: BTreeMap<&'static str, String>,

    // === Results ===
    text_area: TextArea,
    /// Page shown, `None` before the first result
    current_page: Option<usize>,
}

impl<S: ScreenSurface, R: Resolver> SessionController<S, R> {
    /// Lay out the session on `surface`
    ///
    /// Fails if the screen is too small for a text area above the input
    /// line and status bar.
    pub fn new(
        surface: S,
        dictionary: Dictionary<R>,
        config: &DefineConfig,
    ) -> Result<Self, SessionError> {
        let (width, height) = surface.size();
        let text_area = TextArea::new(
            (width, height),
            (0, 0),
            height.saturating_sub(CHROME_ROWS),
            width,
        )?;

        // Keep the whole word and the cursor after it on screen
        let room = usize::from(width).saturating_sub(PROMPT.len() + 1);
        let max_input = config.session.max_input_len.min(room);

        let mut statuses = BTreeMap::new();
        statuses.insert(status::HELP, HELP_TEXT.to_string());

        Ok(Self {
            surface,
            dictionary,
            display: config.display.clone(),
            state: SessionState::Idle,
            input: String::new(),
            max_input,
            statuses,
            text_area,
            current_page: None,
        })
    }

    /// Draw the initial screen and process keys until the session exits
    pub fn run(&mut self) -> Result<(), SessionError> {
        info!(
            max_input = self.max_input,
            resolver = self.dictionary.resolver().name(),
            "Session started"
        );
        self.draw_chrome()?;

        while self.state != SessionState::Exited {
            let key = self.surface.read_key()?;
            self.handle_key(key)?;
        }

        info!("Session ended");
        Ok(())
    }

    /// Process one key to completion
    pub fn handle_key(&mut self, key: Key) -> Result<(), SessionError> {
        if self.state == SessionState::Exited {
            return Ok(());
        }
        debug!(?key, state = ?self.state, "Key");

        self.statuses.remove(status::HELP);
        self.statuses.remove(status::INPUT);
        self.statuses.remove(status::KEY);

        match (self.state, key) {
            (SessionState::Exited, _) => return Ok(()),
            (SessionState::Blocked, _) => {
                self.set_status(status::INPUT, "Please wait for result");
            }
            (SessionState::Idle, Key::Esc | Key::Interrupt) => {
                self.state = SessionState::Exited;
                return Ok(());
            }
            (SessionState::Idle, Key::Char(c)) if c.is_ascii_alphabetic() => self.type_char(c)?,
            (SessionState::Idle, Key::Backspace) => self.delete_char()?,
            (SessionState::Idle, Key::Enter) => self.submit()?,
            (SessionState::Idle, Key::PageDown) => self.turn_page(true)?,
            (SessionState::Idle, Key::PageUp) => self.turn_page(false)?,
            (SessionState::Idle, other) => {
                self.set_status(status::KEY, format!("Unhandled key {}", other.describe()));
            }
        }

        self.draw_status()?;
        self.place_cursor()?;
        self.surface.flush()?;
        Ok(())
    }

    // === Accessors ===

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn max_input(&self) -> usize {
        self.max_input
    }

    pub fn status(&self, label: &str) -> Option<&str> {
        self.statuses.get(label).map(String::as_str)
    }

    /// Status bar text as rendered, before clipping
    pub fn status_text(&self) -> String {
        self.statuses
            .values()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(STATUS_SEPARATOR)
    }

    pub fn current_page(&self) -> Option<usize> {
        self.current_page
    }

    pub fn text_area(&self) -> &TextArea {
        &self.text_area
    }

    pub fn dictionary(&self) -> &Dictionary<R> {
        &self.dictionary
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    // === Key Handling ===

    fn type_char(&mut self, c: char) -> Result<(), SessionError> {
        if self.input.len() >= self.max_input {
            self.set_status(status::INPUT, "Input too long");
            return Ok(());
        }

        let (x, y) = self.input_cell(self.input.len());
        self.surface.draw_styled(x, y, &c.to_string(), SpanStyle::Plain)?;
        self.input.push(c);
        Ok(())
    }

    fn delete_char(&mut self) -> Result<(), SessionError> {
        if self.input.pop().is_none() {
            self.set_status(status::INPUT, "No character to delete");
            return Ok(());
        }

        let (x, y) = self.input_cell(self.input.len());
        self.surface.draw_styled(x, y, " ", SpanStyle::Plain)?;
        Ok(())
    }

    fn submit(&mut self) -> Result<(), SessionError> {
        if self.input.is_empty() {
            self.set_status(status::INPUT, "No word to look up");
            return Ok(());
        }

        let word = self.input.clone();
        self.state = SessionState::Blocked;
        self.set_status(status::LOOKUP, format!("Looking up {word}..."));
        self.draw_status()?;
        self.surface.flush()?;

        let outcome = self.dictionary.lookup(&word);
        self.state = SessionState::Idle;

        match outcome {
            Ok(found) => {
                let text = format_entries(&found.entries, &self.display);
                self.show_result(&text)?;

                let count = found.entries.len();
                let noun = if count == 1 { "entry" } else { "entries" };
                let mut message = format!("{word}: {count} {noun}");
                if found.from_cache {
                    message.push_str(", from cache");
                }
                self.set_status(status::LOOKUP, message);
                self.clear_input()?;
            }
            Err(e) => {
                if !e.is_not_found() {
                    warn!(error = %e, word = %word, "Lookup failed");
                }
                self.set_status(status::LOOKUP, "Word not found");
            }
        }
        Ok(())
    }

    fn turn_page(&mut self, forward: bool) -> Result<(), SessionError> {
        let count = self.text_area.page_count();
        let target = match (self.current_page, forward) {
            (Some(page), true) => Some(page + 1).filter(|&next| next < count),
            (Some(page), false) => page.checked_sub(1),
            (None, _) => None,
        };

        match target {
            Some(index) => {
                self.text_area.display_page(&mut self.surface, index)?;
                self.current_page = Some(index);
                self.set_status(status::PAGE, format!("Page {}/{count}", index + 1));
            }
            None => self.set_status(status::PAGE, "No more pages"),
        }
        Ok(())
    }

    // === Rendering ===

    fn show_result(&mut self, text: &str) -> Result<(), SessionError> {
        self.text_area.clear_content();
        for line in text.lines() {
            match self.text_area.add_line(line) {
                Ok(()) => {}
                Err(LayoutError::Markup(e)) => {
                    warn!(error = %e, line, "Showing line without markup");
                    self.text_area.add_spans(&[StyledSpan::plain(line)]);
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.text_area.display_page(&mut self.surface, 0)?;
        self.current_page = Some(0);
        let count = self.text_area.page_count();
        self.set_status(status::PAGE, format!("Page 1/{count}"));
        Ok(())
    }

    fn draw_chrome(&mut self) -> Result<(), SessionError> {
        let (_, row) = self.input_cell(0);
        self.surface.draw_styled(0, row, PROMPT, SpanStyle::Green)?;
        self.draw_status()?;
        self.place_cursor()?;
        self.surface.flush()?;
        Ok(())
    }

    fn draw_status(&mut self) -> Result<(), SessionError> {
        let (width, height) = self.surface.size();
        let line = clip_to_width(&self.status_text(), usize::from(width));
        self.surface
            .draw_styled(0, height.saturating_sub(1), &line, SpanStyle::Plain)?;
        Ok(())
    }

    fn clear_input(&mut self) -> Result<(), SessionError> {
        let (x, y) = self.input_cell(0);
        let blank = " ".repeat(self.input.len());
        self.surface.draw_styled(x, y, &blank, SpanStyle::Plain)?;
        self.input.clear();
        Ok(())
    }

    fn place_cursor(&mut self) -> Result<(), SessionError> {
        let (x, y) = self.input_cell(self.input.len());
        self.surface.move_cursor(x, y)?;
        Ok(())
    }

    /// Screen cell of input position `index`
    fn input_cell(&self, index: usize) -> (u16, u16) {
        let (_, height) = self.surface.size();
        let column = PROMPT.len() + index;
        (
            u16::try_from(column).unwrap_or(u16::MAX),
            height.saturating_sub(CHROME_ROWS),
        )
    }

    fn set_status(&mut self, label: &'static str, message: impl Into<String>) {
        self.statuses.insert(label, message.into());
    }
}

/// `text` cut to fit in `width - 1` columns, then padded to `width`
fn clip_to_width(text: &str, width: usize) -> String {
    let mut line = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w >= width {
            break;
        }
        used += w;
        line.push(ch);
    }
    line.push_str(&" ".repeat(width.saturating_sub(used)));
    line
}
