//! Widgets

pub mod text_area;

pub use text_area::{display_width, Glyph, LayoutError, Line, Page, TextArea};
