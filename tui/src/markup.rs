//! Styled Text Parser
//!
//! Splits text with inline color tokens into styled spans:
//!
//! ```text
//! "<red>cat</red> /kæt/"  ──►  [("cat", Red), (" /kæt/", Plain)]
//! ```
//!
//! A token is `<` + style code + `>` and is closed by `</` + the same code +
//! `>`. Tokens do not nest. Anything starting with `<` that is not shaped
//! like a token (`<` followed by lowercase letters and `>`) is ordinary
//! text, so `a < b`, `<3` and `<B>` pass through untouched.

use thiserror::Error;

/// Style of a span of text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SpanStyle {
    #[default]
    Plain,
    Red,
    Green,
    Yellow,
}

impl SpanStyle {
    /// Style for a markup code; `b` is keyword emphasis and renders red
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "red" | "b" => Some(Self::Red),
            "green" => Some(Self::Green),
            "yellow" => Some(Self::Yellow),
            _ => None,
        }
    }
}

/// A run of text in one style
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyledSpan {
    pub text: String,
    pub style: SpanStyle,
}

impl StyledSpan {
    pub fn new(text: impl Into<String>, style: SpanStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Unstyled span
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, SpanStyle::Plain)
    }
}

/// Malformed markup
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MarkupError {
    /// A token was opened and never closed
    #[error("<{code}> at byte {offset} is never closed")]
    Unterminated { code: String, offset: usize },

    /// A token names a style that does not exist
    #[error("unknown style <{code}> at byte {offset}")]
    UnknownStyle { code: String, offset: usize },

    /// A closing token has no matching opening token
    #[error("</{code}> at byte {offset} closes nothing")]
    UnexpectedClose { code: String, offset: usize },

    /// A token was opened inside another one
    #[error("<{code}> at byte {offset} is nested inside another style")]
    Nested { code: String, offset: usize },
}

/// A tag-shaped token found at the start of a string
struct Tag<'a> {
    closing: bool,
    code: &'a str,
    len: usize,
}

/// The token currently open while parsing
struct Open<'a> {
    style: SpanStyle,
    code: &'a str,
    offset: usize,
}

/// Parse `text` into styled spans
///
/// Concatenating the span texts gives `text` with all tokens removed.
/// Empty spans are dropped.
pub fn parse(text: &str) -> Result<Vec<StyledSpan>, MarkupError> {
    let mut spans = Vec::new();
    let mut pending = String::new();
    let mut open: Option<Open<'_>> = None;
    let mut i = 0;

    while let Some(found) = text[i..].find('<') {
        let at = i + found;
        pending.push_str(&text[i..at]);

        let Some(tag) = scan_tag(&text[at..]) else {
            pending.push('<');
            i = at + 1;
            continue;
        };
        let style = SpanStyle::from_code(tag.code);
        let error_code = tag.code.to_string();

        let current = open.as_ref().map(|o| (o.style, o.code));
        match (current, tag.closing) {
            (None, false) => {
                let style = style.ok_or(MarkupError::UnknownStyle {
                    code: error_code,
                    offset: at,
                })?;
                flush(&mut spans, &mut pending, SpanStyle::Plain);
                open = Some(Open {
                    style,
                    code: tag.code,
                    offset: at,
                });
            }
            (None, true) => {
                return Err(if style.is_some() {
                    MarkupError::UnexpectedClose {
                        code: error_code,
                        offset: at,
                    }
                } else {
                    MarkupError::UnknownStyle {
                        code: error_code,
                        offset: at,
                    }
                });
            }
            (Some((open_style, open_code)), true) if open_code == tag.code => {
                flush(&mut spans, &mut pending, open_style);
                open = None;
            }
            (Some(_), closing) => {
                return Err(match (style, closing) {
                    (None, _) => MarkupError::UnknownStyle {
                        code: error_code,
                        offset: at,
                    },
                    (Some(_), true) => MarkupError::UnexpectedClose {
                        code: error_code,
                        offset: at,
                    },
                    (Some(_), false) => MarkupError::Nested {
                        code: error_code,
                        offset: at,
                    },
                });
            }
        }

        i = at + tag.len;
    }
    pending.push_str(&text[i..]);

    if let Some(current) = open {
        return Err(MarkupError::Unterminated {
            code: current.code.to_string(),
            offset: current.offset,
        });
    }

    flush(&mut spans, &mut pending, SpanStyle::Plain);
    Ok(spans)
}

/// The text of `text` with markup removed
pub fn strip(text: &str) -> Result<String, MarkupError> {
    Ok(parse(text)?.into_iter().map(|span| span.text).collect())
}

fn flush(spans: &mut Vec<StyledSpan>, pending: &mut String, style: SpanStyle) {
    if !pending.is_empty() {
        spans.push(StyledSpan::new(std::mem::take(pending), style));
    }
}

/// Recognize `<code>` or `</code>` at the start of `rest`
fn scan_tag(rest: &str) -> Option<Tag<'_>> {
    let bytes = rest.as_bytes();
    let closing = bytes.get(1) == Some(&b'/');
    let start = if closing { 2 } else { 1 };

    let mut end = start;
    while bytes.get(end).is_some_and(u8::is_ascii_lowercase) {
        end += 1;
    }

    if end == start || bytes.get(end) != Some(&b'>') {
        return None;
    }

    Some(Tag {
        closing,
        code: &rest[start..end],
        len: end + 1,
    })
}
