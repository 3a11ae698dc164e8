//! Crossterm-backed surface
//!
//! Draws go into a [`Canvas`]; `flush` hands the canvas to ratatui, which
//! diffs it against the last frame and writes only the changed cells.
//! This is the only place in the library that touches the terminal crates.

use std::io::{self, Stdout, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Stylize;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{debug, warn};

use super::{Canvas, Key, ScreenSurface};
use crate::markup::{self, SpanStyle, StyledSpan};

/// The real terminal
pub struct TerminalSurface {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    canvas: Canvas,
}

impl TerminalSurface {
    /// Wrap an initialized terminal (raw mode and alternate screen are the
    /// caller's business)
    pub fn new(terminal: Terminal<CrosstermBackend<Stdout>>) -> io::Result<Self> {
        let size = terminal.size()?;
        Ok(Self {
            terminal,
            canvas: Canvas::new(size.width, size.height),
        })
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }
}

impl ScreenSurface for TerminalSurface {
    fn size(&self) -> (u16, u16) {
        self.canvas.size()
    }

    fn draw_styled(&mut self, x: u16, y: u16, text: &str, style: SpanStyle) -> io::Result<()> {
        self.canvas.draw(x, y, text, style);
        Ok(())
    }

    fn cursor(&self) -> (u16, u16) {
        self.canvas.cursor()
    }

    fn move_cursor(&mut self, x: u16, y: u16) -> io::Result<()> {
        self.canvas.move_cursor(x, y);
        Ok(())
    }

    fn push_cursor(&mut self) {
        self.canvas.push_cursor();
    }

    fn pop_cursor(&mut self) -> io::Result<()> {
        self.canvas.pop_cursor()
    }

    fn read_key(&mut self) -> io::Result<Key> {
        loop {
            match event::read()? {
                // Only handle key press events (not release)
                Event::Key(key) if key.kind == KeyEventKind::Press => return Ok(map_key(key)),
                Event::Resize(width, height) => {
                    debug!(width, height, "Terminal resized; keeping session geometry");
                }
                _ => {}
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let Self { terminal, canvas } = self;
        terminal.draw(|frame| {
            let area = frame.area();
            let (width, height) = canvas.size();
            let buffer = frame.buffer_mut();
            for y in 0..height.min(area.height) {
                for x in 0..width.min(area.width) {
                    buffer[(x, y)] = canvas.buffer()[(x, y)].clone();
                }
            }
            frame.set_cursor_position(canvas.cursor());
        })?;
        Ok(())
    }
}

fn map_key(key: KeyEvent) -> Key {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Key::Interrupt,
        KeyCode::Char(c) if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            Key::Other(format!("{:?}+{c:?}", key.modifiers))
        }
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Esc => Key::Esc,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        other => Key::Other(format!("{other:?}")),
    }
}

/// Write spans as ANSI-colored text, or as plain text when `color` is off
pub fn write_spans(out: &mut impl Write, spans: &[StyledSpan], color: bool) -> io::Result<()> {
    for span in spans {
        let text = span.text.as_str();
        match (color, span.style) {
            (false, _) | (true, SpanStyle::Plain) => write!(out, "{text}")?,
            (true, SpanStyle::Red) => write!(out, "{}", text.red().bold())?,
            (true, SpanStyle::Green) => write!(out, "{}", text.green())?,
            (true, SpanStyle::Yellow) => write!(out, "{}", text.yellow())?,
        }
    }
    Ok(())
}

/// Print a marked-up block line by line
///
/// Without color the markup is stripped. A line whose markup does not parse
/// is printed as-is.
pub fn print_block(out: &mut impl Write, block: &str, color: bool) -> io::Result<()> {
    for line in block.lines() {
        let printed = if color {
            markup::parse(line).map(|spans| write_spans(out, &spans, true))
        } else {
            markup::strip(line).map(|text| write!(out, "{text}"))
        };
        match printed {
            Ok(written) => written?,
            Err(e) => {
                warn!(error = %e, line, "Printing line without markup");
                write!(out, "{line}")?;
            }
        }
        writeln!(out)?;
    }
    out.flush()
}
