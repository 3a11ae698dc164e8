//! Cache-first lookups
//!
//! [`Dictionary`] ties a [`Resolver`] to a [`ResultCache`]: the cache is
//! consulted first, the resolver only on a miss, and only successful
//! resolver results are stored.

use tracing::{info, warn};

use crate::cache::ResultCache;
use crate::entry::LookupResult;
use crate::resolver::{LookupError, Resolver};

/// A successful lookup
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Found {
    /// The entries, in resolver order
    pub entries: LookupResult,
    /// Whether they were served from the cache
    pub from_cache: bool,
}

/// Cache-backed dictionary over a resolver
pub struct Dictionary<R: Resolver> {
    resolver: R,
    cache: ResultCache,
    /// Skip cache reads (writes still follow the cache's own settings)
    bypass_cache: bool,
}

impl<R: Resolver> Dictionary<R> {
    pub fn new(resolver: R, cache: ResultCache) -> Self {
        Self {
            resolver,
            cache,
            bypass_cache: false,
        }
    }

    /// Always go to the resolver, ignoring cached records
    #[must_use]
    pub fn with_bypass(mut self, bypass_cache: bool) -> Self {
        self.bypass_cache = bypass_cache;
        self
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Look up `word` (case-sensitive, as typed)
    ///
    /// No entries means not found, whether the resolver answered with none
    /// or a cached record holds none (that record is a miss). A failure to
    /// write the cache is logged and does not fail the lookup.
    pub fn lookup(&mut self, word: &str) -> Result<Found, LookupError> {
        if !self.bypass_cache {
            let cached = self.cache.get::<LookupResult>(word);
            if let Some(entries) = cached.filter(|entries| !entries.is_empty()) {
                return Ok(Found {
                    entries,
                    from_cache: true,
                });
            }
        }

        info!(word, resolver = self.resolver.name(), "Looking up word");
        let entries = self.resolver.lookup(word)?;
        if entries.is_empty() {
            return Err(LookupError::not_found(word));
        }

        if let Err(e) = self.cache.put(word, &entries) {
            warn!(error = %e, word, "Failed to cache lookup result");
        }

        Ok(Found {
            entries,
            from_cache: false,
        })
    }
}
