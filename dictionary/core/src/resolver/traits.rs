//! Resolver Traits
//!
//! The seam between the lookup core and whatever produces dictionary data.
//! Lookups are synchronous: the interactive session blocks on them by design.

use thiserror::Error;

use crate::entry::LookupResult;

/// Errors a resolver can report
#[derive(Debug, Error)]
pub enum LookupError {
    /// The dictionary has no entry for the word
    #[error("no definitions found for {word:?}")]
    NotFound {
        /// The word that was looked up
        word: String,
    },

    /// The request could not be built or sent
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The dictionary answered with an unexpected HTTP status
    #[error("dictionary returned HTTP {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// The response body was not in the expected shape
    #[error("unexpected response format: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured endpoint is not a usable URL
    #[error("invalid dictionary URL {url:?}")]
    InvalidUrl {
        /// The configured base URL
        url: String,
    },
}

impl LookupError {
    /// Create a not-found error for `word`
    pub fn not_found(word: impl Into<String>) -> Self {
        Self::NotFound { word: word.into() }
    }

    /// Whether this error means the word simply does not exist
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Dictionary resolver trait
///
/// Implement this trait to add a new source of dictionary entries.
pub trait Resolver {
    /// Get the resolver name (e.g., "FreeDictionary")
    fn name(&self) -> &str;

    /// Look up `word`, returning its entries in dictionary order
    fn lookup(&self, word: &str) -> Result<LookupResult, LookupError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_distinguished() {
        assert!(LookupError::not_found("zzz").is_not_found());
        assert!(!LookupError::Status { status: 500 }.is_not_found());
    }

    #[test]
    fn test_not_found_message_names_word() {
        let message = LookupError::not_found("zzz").to_string();
        assert_eq!(message, "no definitions found for \"zzz\"");
    }
}
