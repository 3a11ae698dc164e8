//! TextArea Widget
//!
//! A fixed rectangle of the screen that holds wrapped, paginated text.
//!
//! Text arrives as marked-up lines, is broken into [`Glyph`]s and wrapped
//! greedily into [`Line`]s. Lines fill [`Page`]s of `rows` lines each; one
//! page is shown at a time.
//!
//! ```text
//!          cols
//!   ┌───────────────┐
//!   │ line 0        │
//!   │ line 1        │ rows   ◄── page 0
//!   │ line 2        │
//!   └───────────────┘
//!     line 3 ...           ◄── page 1
//! ```

use std::io;

use thiserror::Error;
use unicode_width::UnicodeWidthStr;

use crate::markup::{self, MarkupError, SpanStyle, StyledSpan};
use crate::screen::{with_saved_cursor, ScreenSurface};

/// Misconfigured or misused text area
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("text area has no rows or no columns")]
    EmptyArea,

    #[error(
        "text area of {rows}x{cols} at ({x}, {y}) does not fit a {width}x{height} screen"
    )]
    AreaOutOfBounds {
        x: u16,
        y: u16,
        rows: u16,
        cols: u16,
        width: u16,
        height: u16,
    },

    #[error("line contains a line break")]
    EmbeddedLineBreak,

    #[error("page {index} requested but there are {count} pages")]
    PageOutOfRange { index: usize, count: usize },

    #[error("markup error: {0}")]
    Markup(#[from] MarkupError),

    #[error("surface error: {0}")]
    Surface(#[from] io::Error),
}

/// Columns a character is laid out with
///
/// Code points below 256 take one column, everything else two. Wide
/// scripts never overflow a line this way; narrow ones may leave a gap.
#[must_use]
pub fn display_width(ch: char) -> usize {
    if u32::from(ch) < 256 {
        1
    } else {
        2
    }
}

/// One character with its layout width and style
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub width: usize,
    pub style: SpanStyle,
}

impl Glyph {
    pub fn new(ch: char, style: SpanStyle) -> Self {
        Self {
            ch,
            width: display_width(ch),
            style,
        }
    }
}

/// A wrapped line
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Line {
    glyphs: Vec<Glyph>,
}

impl Line {
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Layout width
    pub fn width(&self) -> usize {
        self.glyphs.iter().map(|g| g.width).sum()
    }

    pub fn text(&self) -> String {
        self.glyphs.iter().map(|g| g.ch).collect()
    }

    /// Maximal runs of same-styled text, in order
    pub fn runs(&self) -> Vec<StyledSpan> {
        let mut runs: Vec<StyledSpan> = Vec::new();
        for glyph in &self.glyphs {
            match runs.last_mut() {
                Some(run) if run.style == glyph.style => run.text.push(glyph.ch),
                _ => runs.push(StyledSpan::new(glyph.ch.to_string(), glyph.style)),
            }
        }
        runs
    }
}

/// Up to `rows` lines
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Page {
    lines: Vec<Line>,
}

impl Page {
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Paginated text in a fixed screen rectangle
#[derive(Clone, Debug)]
pub struct TextArea {
    x: u16,
    y: u16,
    rows: u16,
    cols: u16,
    pages: Vec<Page>,
}

impl TextArea {
    /// A `rows` x `cols` area with its top-left corner at `origin`
    ///
    /// `surface_size` is `(columns, rows)` of the screen; the area must fit.
    pub fn new(
        surface_size: (u16, u16),
        origin: (u16, u16),
        rows: u16,
        cols: u16,
    ) -> Result<Self, LayoutError> {
        if rows == 0 || cols == 0 {
            return Err(LayoutError::EmptyArea);
        }

        let (width, height) = surface_size;
        let (x, y) = origin;
        if u32::from(x) + u32::from(cols) > u32::from(width)
            || u32::from(y) + u32::from(rows) > u32::from(height)
        {
            return Err(LayoutError::AreaOutOfBounds {
                x,
                y,
                rows,
                cols,
                width,
                height,
            });
        }

        Ok(Self {
            x,
            y,
            rows,
            cols,
            pages: vec![Page::default()],
        })
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Columns available to a line, including the one-column margin
    pub fn column_budget(&self) -> usize {
        usize::from(self.cols)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn line_count(&self) -> usize {
        self.pages.iter().map(Page::len).sum()
    }

    /// Add every line of a multi-line block
    ///
    /// A trailing line break ends the last line rather than starting an
    /// empty one; an empty block is one empty line. Stops at the first
    /// line that fails; earlier lines stay added.
    pub fn add_block(&mut self, text: &str) -> Result<(), LayoutError> {
        if text.is_empty() {
            return self.add_line("");
        }
        for line in text.lines() {
            self.add_line(line)?;
        }
        Ok(())
    }

    /// Parse and wrap a single line of marked-up text
    ///
    /// A lone line break is a blank line; a break inside text is an error.
    pub fn add_line(&mut self, text: &str) -> Result<(), LayoutError> {
        let text = match text {
            "\n" | "\r\n" => "",
            other => other,
        };
        if text.contains(['\n', '\r']) {
            return Err(LayoutError::EmbeddedLineBreak);
        }
        let spans = markup::parse(text)?;
        self.add_spans(&spans);
        Ok(())
    }

    /// Wrap already-styled text as one logical line
    pub fn add_spans(&mut self, spans: &[StyledSpan]) {
        for line in self.wrap(spans) {
            self.push_line(line);
        }
    }

    /// Forget all text; the screen is not touched
    pub fn clear_content(&mut self) {
        self.pages = vec![Page::default()];
    }

    /// Blank the area on screen
    pub fn clear_display<S>(&self, surface: &mut S) -> Result<(), LayoutError>
    where
        S: ScreenSurface + ?Sized,
    {
        let blank = " ".repeat(usize::from(self.cols));
        with_saved_cursor(surface, |surface| {
            for row in 0..self.rows {
                surface.draw_styled(self.x, self.y + row, &blank, SpanStyle::Plain)?;
            }
            Ok(())
        })
    }

    /// Clear the area and draw page `index`
    pub fn display_page<S>(&self, surface: &mut S, index: usize) -> Result<(), LayoutError>
    where
        S: ScreenSurface + ?Sized,
    {
        let page = self.page(index).ok_or(LayoutError::PageOutOfRange {
            index,
            count: self.page_count(),
        })?;

        self.clear_display(surface)?;
        with_saved_cursor(surface, |surface| {
            for (row, line) in (0u16..).zip(page.lines()) {
                let mut x = self.x;
                for run in line.runs() {
                    surface.draw_styled(x, self.y + row, &run.text, run.style)?;
                    // Advance by what the terminal actually occupies
                    x = x.saturating_add(u16::try_from(run.text.width()).unwrap_or(u16::MAX));
                }
            }
            Ok(())
        })
    }

    fn push_line(&mut self, line: Line) {
        let rows = usize::from(self.rows);
        match self.pages.last_mut() {
            Some(page) if page.len() < rows => page.lines.push(line),
            _ => self.pages.push(Page { lines: vec![line] }),
        }
    }

    /// Greedy width-fill; every line keeps at least one glyph
    fn wrap(&self, spans: &[StyledSpan]) -> Vec<Line> {
        let budget = self.column_budget();
        let mut lines = Vec::new();
        let mut current = Line::default();
        let mut used = 0;

        for span in spans {
            for ch in span.text.chars() {
                let glyph = Glyph::new(ch, span.style);
                if !current.is_empty() && used + glyph.width + 1 >= budget {
                    lines.push(std::mem::take(&mut current));
                    used = 0;
                }
                used += glyph.width;
                current.glyphs.push(glyph);
            }
        }
        lines.push(current);
        lines
    }
}
