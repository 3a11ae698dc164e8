//! In-memory surface for tests and headless runs

use std::collections::VecDeque;
use std::io;

use super::{Canvas, Key, ScreenSurface};
use crate::markup::SpanStyle;

/// One `draw_styled` call as it was made
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawCall {
    pub x: u16,
    pub y: u16,
    pub text: String,
    pub style: SpanStyle,
}

/// Surface with scripted keys that records every draw
///
/// `read_key` fails with `UnexpectedEof` once the script runs out.
#[derive(Debug)]
pub struct MemorySurface {
    canvas: Canvas,
    keys: VecDeque<Key>,
    draws: Vec<DrawCall>,
    flushes: usize,
}

impl MemorySurface {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            canvas: Canvas::new(width, height),
            keys: VecDeque::new(),
            draws: Vec::new(),
            flushes: 0,
        }
    }

    #[must_use]
    pub fn with_keys(mut self, keys: impl IntoIterator<Item = Key>) -> Self {
        self.keys.extend(keys);
        self
    }

    /// Script typing `text` one character at a time
    #[must_use]
    pub fn with_typed(self, text: &str) -> Self {
        self.with_keys(text.chars().map(Key::Char))
    }

    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    pub fn clear_draws(&mut self) {
        self.draws.clear();
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    pub fn row_text(&self, y: u16) -> String {
        self.canvas.row_text(y)
    }
}

impl ScreenSurface for MemorySurface {
    fn size(&self) -> (u16, u16) {
        self.canvas.size()
    }

    fn draw_styled(&mut self, x: u16, y: u16, text: &str, style: SpanStyle) -> io::Result<()> {
        self.draws.push(DrawCall {
            x,
            y,
            text: text.to_string(),
            style,
        });
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
        self.keys
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted keys left"))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}
