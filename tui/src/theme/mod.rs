//! Theme and Colors
//!
//! Colors for the markup styles. Everything that draws goes through
//! [`style_for`] so markup never carries terminal color codes itself.

use ratatui::style::{Color, Modifier, Style};

use crate::markup::SpanStyle;

// ============================================================================
// Markup Colors
// ============================================================================

/// Headwords and keyword emphasis - bold red
pub const EMPHASIS_RED: Color = Color::Red;

/// Related words
pub const EMPHASIS_GREEN: Color = Color::Green;

/// Frequency stars and section headings
pub const EMPHASIS_YELLOW: Color = Color::Yellow;

/// Terminal style for a markup style
#[must_use]
pub fn style_for(style: SpanStyle) -> Style {
    match style {
        SpanStyle::Plain => Style::default(),
        SpanStyle::Red => Style::default()
            .fg(EMPHASIS_RED)
            .add_modifier(Modifier::BOLD),
        SpanStyle::Green => Style::default().fg(EMPHASIS_GREEN),
        SpanStyle::Yellow => Style::default().fg(EMPHASIS_YELLOW),
    }
}
