//! Screen Surface
//!
//! The session never talks to the terminal directly. Everything it needs from
//! a character-cell screen is behind [`ScreenSurface`]:
//!
//! - dimensions
//! - absolute cursor placement, with a save/restore stack
//! - styled string drawing
//! - raw key input
//! - flush
//!
//! Two implementations share the [`Canvas`] cell store:
//! [`TerminalSurface`] (crossterm through ratatui) and [`MemorySurface`]
//! (scripted keys, recorded draws) for tests.

mod memory;
mod terminal;

use std::io;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use crate::markup::SpanStyle;
use crate::theme;

pub use memory::{DrawCall, MemorySurface};
pub use terminal::{print_block, write_spans, TerminalSurface};

/// A key event, as far as the session cares
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Esc,
    PageUp,
    PageDown,
    /// Ctrl-C
    Interrupt,
    /// Anything else, described by the backend
    Other(String),
}

impl Key {
    /// Raw description shown for keys the session does not handle
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Char(c) => format!("{c:?} (0x{:02x})", u32::from(*c)),
            Self::Enter => "Enter".to_string(),
            Self::Backspace => "Backspace".to_string(),
            Self::Esc => "Esc".to_string(),
            Self::PageUp => "PageUp".to_string(),
            Self::PageDown => "PageDown".to_string(),
            Self::Interrupt => "Ctrl-C".to_string(),
            Self::Other(raw) => raw.clone(),
        }
    }
}

/// A character-cell screen with key input
///
/// Coordinates are absolute, `(column, row)` from the top-left corner.
/// Drawing outside the screen is clipped, never an error.
pub trait ScreenSurface {
    /// `(columns, rows)`
    fn size(&self) -> (u16, u16);

    /// Draw `text` starting at `(x, y)`
    fn draw_styled(&mut self, x: u16, y: u16, text: &str, style: SpanStyle) -> io::Result<()>;

    /// Current cursor position
    fn cursor(&self) -> (u16, u16);

    /// Place the cursor
    fn move_cursor(&mut self, x: u16, y: u16) -> io::Result<()>;

    /// Save the cursor position
    fn push_cursor(&mut self);

    /// Restore the most recently saved cursor position
    fn pop_cursor(&mut self) -> io::Result<()>;

    /// Block until the next key
    fn read_key(&mut self) -> io::Result<Key>;

    /// Make everything drawn so far visible
    fn flush(&mut self) -> io::Result<()>;
}

/// Run `f` with the cursor saved, restoring it afterwards even if `f` fails
pub fn with_saved_cursor<S, T, E>(
    surface: &mut S,
    f: impl FnOnce(&mut S) -> Result<T, E>,
) -> Result<T, E>
where
    S: ScreenSurface + ?Sized,
    E: From<io::Error>,
{
    surface.push_cursor();
    let result = f(surface);
    let restored = surface.pop_cursor();
    let value = result?;
    restored?;
    Ok(value)
}

/// Cell grid plus cursor state shared by the surfaces
#[derive(Clone, Debug)]
pub struct Canvas {
    buffer: Buffer,
    cursor: (u16, u16),
    saved: Vec<(u16, u16)>,
}

impl Canvas {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            buffer: Buffer::empty(Rect::new(0, 0, width, height)),
            cursor: (0, 0),
            saved: Vec::new(),
        }
    }

    pub fn size(&self) -> (u16, u16) {
        (self.buffer.area.width, self.buffer.area.height)
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Write `text` at `(x, y)`, clipped to the right edge
    pub fn draw(&mut self, x: u16, y: u16, text: &str, style: SpanStyle) {
        let (width, height) = self.size();
        if x >= width || y >= height {
            return;
        }
        self.buffer.set_stringn(
            x,
            y,
            text,
            usize::from(width - x),
            theme::style_for(style),
        );
    }

    pub fn cursor(&self) -> (u16, u16) {
        self.cursor
    }

    pub fn move_cursor(&mut self, x: u16, y: u16) {
        let (width, height) = self.size();
        self.cursor = (
            x.min(width.saturating_sub(1)),
            y.min(height.saturating_sub(1)),
        );
    }

    pub fn push_cursor(&mut self) {
        self.saved.push(self.cursor);
    }

    pub fn pop_cursor(&mut self) -> io::Result<()> {
        let cursor = self.saved.pop().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "no saved cursor position")
        })?;
        self.cursor = cursor;
        Ok(())
    }

    /// Cell symbols of row `y`, trailing blanks removed
    pub fn row_text(&self, y: u16) -> String {
        let (width, height) = self.size();
        if y >= height {
            return String::new();
        }
        let row: String = (0..width)
            .map(|x| self.buffer[(x, y)].symbol().to_string())
            .collect();
        row.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    #[test]
    fn test_draw_is_clipped_at_right_edge() {
        let mut canvas = Canvas::new(5, 2);
        canvas.draw(3, 0, "abcdef", SpanStyle::Plain);
        assert_eq!(canvas.row_text(0), "   ab");
    }

    #[test]
    fn test_draw_off_screen_is_ignored() {
        let mut canvas = Canvas::new(5, 2);
        canvas.draw(9, 0, "x", SpanStyle::Plain);
        canvas.draw(0, 7, "x", SpanStyle::Plain);
        assert_eq!(canvas.row_text(0), "");
        assert_eq!(canvas.row_text(1), "");
    }

    #[test]
    fn test_draw_applies_theme_style() {
        let mut canvas = Canvas::new(5, 1);
        canvas.draw(0, 0, "hi", SpanStyle::Green);
        assert_eq!(canvas.buffer()[(0, 0)].fg, Color::Green);
        assert_eq!(canvas.buffer()[(2, 0)].fg, Color::Reset);
    }

    #[test]
    fn test_cursor_stack() {
        let mut canvas = Canvas::new(10, 10);
        canvas.move_cursor(2, 3);
        canvas.push_cursor();
        canvas.move_cursor(7, 7);
        canvas.pop_cursor().unwrap();
        assert_eq!(canvas.cursor(), (2, 3));
        assert!(canvas.pop_cursor().is_err());
    }

    #[test]
    fn test_cursor_is_kept_on_screen() {
        let mut canvas = Canvas::new(4, 3);
        canvas.move_cursor(40, 30);
        assert_eq!(canvas.cursor(), (3, 2));
    }

    #[test]
    fn test_with_saved_cursor_restores_after_error() {
        let mut surface = MemorySurface::new(10, 4);
        surface.move_cursor(1, 1).unwrap();

        let result: io::Result<()> = with_saved_cursor(&mut surface, |s| {
            s.move_cursor(5, 3)?;
            Err(io::Error::new(io::ErrorKind::Other, "draw failed"))
        });

        assert!(result.is_err());
        assert_eq!(surface.cursor(), (1, 1));
    }

    #[test]
    fn test_key_description() {
        assert_eq!(Key::Char('1').describe(), "'1' (0x31)");
        assert_eq!(Key::Other("F(5)".to_string()).describe(), "F(5)");
    }
}
