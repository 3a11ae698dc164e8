//! Dictionary Resolvers
//!
//! A resolver turns a word into structured dictionary entries. The lookup
//! core only ever sees [`DictEntry`](crate::DictEntry) records; how a
//! resolver obtains them (HTTP, a local file, a test fixture) is its own
//! business.
//!
//! # Available Resolvers
//!
//! - **FreeDictionary**: JSON dictionary API over HTTP (default)
//!
//! # Usage
//!
//! ```ignore
//! use define_core::resolver::{FreeDictionaryResolver, Resolver};
//!
//! let resolver = FreeDictionaryResolver::new(FreeDictionaryResolver::DEFAULT_BASE_URL, 10)?;
//! let entries = resolver.lookup("cat")?;
//! ```

mod free_dictionary;
mod traits;

pub use free_dictionary::FreeDictionaryResolver;
pub use traits::{LookupError, Resolver};
