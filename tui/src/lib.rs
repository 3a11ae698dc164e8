//! define TUI - terminal front end for the define dictionary
//!
//! # Architecture
//!
//! - **Screen**: the `ScreenSurface` capability trait and its crossterm and
//!   in-memory implementations
//! - **Markup**: inline color tokens parsed into styled spans
//! - **Widgets**: the wrapping, paginating `TextArea`
//! - **App**: the `SessionController` input state machine
//!
//! Lookups, caching and formatting live in `define-core`.

pub mod app;
pub mod markup;
pub mod screen;
pub mod theme;
pub mod widgets;

pub use app::{SessionController, SessionError, SessionState};
