//! Define Core - Headless word lookup for the `define` tool
//!
//! This crate holds everything that does not need a terminal: the dictionary
//! entry model, the bounded on-disk result cache, the resolver abstraction and
//! the text formatting that turns entries into marked-up display text.
//!
//! # Architecture
//!
//! ```text
//!   word ──► Dictionary ──► ResultCache::get ──hit──► entries
//!                 │                 │
//!                 │               miss
//!                 │                 ▼
//!                 └──────────► Resolver::lookup ──► ResultCache::put
//! ```
//!
//! # Key Types
//!
//! - [`Dictionary`]: cache-first lookup over any [`Resolver`]
//! - [`ResultCache`]: bounded disk cache with randomized eviction
//! - [`DictEntry`]: one dictionary entry as produced by a resolver
//! - [`DefineConfig`]: runtime options (file, environment, CLI)

pub mod cache;
pub mod config;
pub mod dictionary;
pub mod entry;
pub mod format;
pub mod resolver;

pub use cache::{CacheEntry, CacheError, CacheLimit, ResultCache};
pub use config::{ConfigError, ConfigOverrides, DefineConfig};
pub use dictionary::{Dictionary, Found};
pub use entry::{DictEntry, Example, Frequency, LookupResult, Meaning, WordGroup};
pub use format::{format_entries, DisplayOptions};
pub use resolver::{FreeDictionaryResolver, LookupError, Resolver};
