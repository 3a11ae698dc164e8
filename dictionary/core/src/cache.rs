//! Bounded on-disk result cache with randomized eviction
//!
//! Every successful lookup is stored as one JSON file per key. The cache
//! never looks inside a record beyond checking that it deserializes.
//!
//! # Design
//!
//! - **Bounded**: before each write the cache is trimmed to `limit - 1`
//!   entries, so a write never pushes it over `limit`
//! - **Random eviction**: victims are drawn uniformly without replacement
//!   (partial Fisher-Yates), not by recency
//! - **Repair on read**: a record that fails to deserialize is deleted and
//!   reported as a miss
//!
//! The cache directory is assumed to belong to a single process. There is no
//! locking; concurrent invocations may race on trim and put.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

/// File extension of cache records
const RECORD_EXTENSION: &str = "json";

/// Prefix of hex-encoded file stems for keys that are not filesystem-safe
const HEX_STEM_PREFIX: &str = "x-";

/// Maximum number of entries the cache may hold
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheLimit {
    /// At most this many entries; `Bounded(0)` disables caching
    Bounded(usize),
    /// No limit; trimming is disabled
    Unbounded,
}

impl CacheLimit {
    /// Whether writes are disabled entirely
    #[must_use]
    pub fn is_disabled(self) -> bool {
        matches!(self, Self::Bounded(0))
    }
}

impl Default for CacheLimit {
    fn default() -> Self {
        Self::Bounded(1000)
    }
}

impl fmt::Display for CacheLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(n) => write!(f, "{n}"),
            Self::Unbounded => write!(f, "unbounded"),
        }
    }
}

impl FromStr for CacheLimit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unbounded" | "none" | "unlimited" => Ok(Self::Unbounded),
            other => other
                .parse::<usize>()
                .map(Self::Bounded)
                .map_err(|_| format!("expected a number or \"unbounded\", got {s:?}")),
        }
    }
}

/// Errors that can occur during cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    /// Filesystem operation failed
    #[error("cache I/O failed at {path}: {source}")]
    Io {
        /// The path being accessed
        path: PathBuf,
        /// The underlying IO error
        source: io::Error,
    },

    /// The value could not be serialized
    #[error("failed to encode cache record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A record currently stored in the cache directory
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheEntry {
    /// The lookup key the record was stored under
    pub key: String,
    /// Location of the record on disk
    pub path: PathBuf,
}

/// Disk-backed key/value cache for lookup results
pub struct ResultCache {
    /// Directory holding one record per key
    dir: PathBuf,
    /// Entry count limit
    limit: CacheLimit,
    /// When false, `put` is a no-op ("do not persist" mode)
    persist: bool,
    /// Random source for eviction
    rng: StdRng,
}

impl ResultCache {
    /// Create a cache rooted at `dir`
    ///
    /// The directory is created lazily on the first write.
    pub fn new(dir: impl Into<PathBuf>, limit: CacheLimit) -> Self {
        Self {
            dir: dir.into(),
            limit,
            persist: true,
            rng: StdRng::from_entropy(),
        }
    }

    /// Turn the "do not persist" mode on or off
    #[must_use]
    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    /// Use a specific random source for eviction
    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Cache directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read the record for `key`
    ///
    /// Returns `None` on a miss. A record that fails to deserialize is
    /// deleted and also reported as a miss; corruption never reaches the
    /// caller.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.record_path(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(key, "Cache miss");
                return None;
            }
            Err(e) => {
                warn!(error = %e, path = ?path, "Failed to read cache record");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                debug!(key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(error = %e, path = ?path, "Invalid cache record, removing");
                if let Err(e) = fs::remove_file(&path) {
                    warn!(error = %e, path = ?path, "Failed to remove invalid cache record");
                }
                None
            }
        }
    }

    /// Store `value` under `key`
    ///
    /// No-op when the cache is disabled (`Bounded(0)`) or persistence is off.
    /// Otherwise the cache is first trimmed to `limit - 1` entries, then the
    /// record is written, replacing any existing record for `key`.
    pub fn put<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), CacheError> {
        if !self.persist || self.limit.is_disabled() {
            debug!(key, "Cache write skipped");
            return Ok(());
        }

        if let CacheLimit::Bounded(limit) = self.limit {
            self.trim(CacheLimit::Bounded(limit - 1))?;
        }

        fs::create_dir_all(&self.dir).map_err(|source| CacheError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.record_path(key);
        if path.exists() {
            warn!(key, path = ?path, "Overwriting existing cache record");
        }

        let bytes = serde_json::to_vec(value)?;
        fs::write(&path, bytes).map_err(|source| CacheError::Io {
            path: path.clone(),
            source,
        })?;

        debug!(key, path = ?path, "Cache record written");
        Ok(())
    }

    /// Delete random entries until at most `limit` remain
    ///
    /// Returns the number of entries actually deleted. An entry that cannot
    /// be removed is logged and not counted. `Unbounded` deletes nothing.
    pub fn trim(&mut self, limit: CacheLimit) -> Result<usize, CacheError> {
        let CacheLimit::Bounded(limit) = limit else {
            return Ok(0);
        };

        let entries = self.entries()?;
        let delta = entries.len().saturating_sub(limit);
        if delta == 0 {
            return Ok(0);
        }

        let rng = &mut self.rng;
        let victims = choose_victims(entries.len(), delta, |lo, hi| rng.gen_range(lo..hi));

        let mut deleted = 0;
        for index in victims {
            let entry = &entries[index];
            match fs::remove_file(&entry.path) {
                Ok(()) => deleted += 1,
                Err(e) => warn!(error = %e, path = ?entry.path, "Failed to evict cache record"),
            }
        }

        info!(deleted, remaining = entries.len() - deleted, "Cache trimmed");
        Ok(deleted)
    }

    /// List the records currently in the cache, sorted by path
    pub fn entries(&self) -> Result<Vec<CacheEntry>, CacheError> {
        let dir = match fs::read_dir(&self.dir) {
            Ok(dir) => dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(CacheError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut entries = Vec::new();
        for item in dir {
            let item = item.map_err(|source| CacheError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let path = item.path();
            if !path.is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION)
            {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            entries.push(CacheEntry {
                key: key_for_stem(stem),
                path,
            });
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    /// Number of records currently in the cache
    pub fn len(&self) -> Result<usize, CacheError> {
        Ok(self.entries()?.len())
    }

    /// Whether the cache holds no records
    pub fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.len()? == 0)
    }

    /// Path of the record for `key`
    pub fn record_path(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{RECORD_EXTENSION}", stem_for_key(key)))
    }
}

/// Pick `delta` distinct indices out of `0..len`, uniformly at random
///
/// Runs the first `delta` steps of a Fisher-Yates shuffle over an explicit
/// index array and returns the shuffled prefix. `pick(lo, hi)` must return a
/// value in `lo..hi`; out-of-range values are clamped.
pub fn choose_victims(
    len: usize,
    delta: usize,
    mut pick: impl FnMut(usize, usize) -> usize,
) -> Vec<usize> {
    let delta = delta.min(len);
    let mut indices: Vec<usize> = (0..len).collect();

    for i in 0..delta {
        let j = pick(i, len).clamp(i, len - 1);
        indices.swap(i, j);
    }

    indices.truncate(delta);
    indices
}

fn stem_for_key(key: &str) -> String {
    let safe = !key.is_empty()
        && !key.starts_with(HEX_STEM_PREFIX)
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if safe {
        key.to_string()
    } else {
        format!("{HEX_STEM_PREFIX}{}", hex::encode(key))
    }
}

fn key_for_stem(stem: &str) -> String {
    stem.strip_prefix(HEX_STEM_PREFIX)
        .and_then(|encoded| hex::decode(encoded).ok())
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| stem.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn seeded_cache(dir: &TempDir, limit: CacheLimit) -> ResultCache {
        ResultCache::new(dir.path(), limit).with_rng(StdRng::seed_from_u64(7))
    }

    fn fill(cache: &ResultCache, count: usize) {
        fs::create_dir_all(cache.dir()).unwrap();
        for i in 0..count {
            fs::write(cache.record_path(&format!("word{i}")), b"[]").unwrap();
        }
    }

    // ===================
    // Key naming tests
    // ===================

    #[test]
    fn test_safe_keys_map_to_plain_file_names() {
        assert_eq!(stem_for_key("Cat"), "Cat");
        assert_eq!(stem_for_key("ice-cream_2"), "ice-cream_2");
    }

    #[test]
    fn test_unsafe_keys_are_hex_encoded() {
        assert_eq!(stem_for_key("a/b"), "x-612f62");
        assert_eq!(stem_for_key(""), "x-");
        // A literal "x-" key must not collide with encoded names
        assert_eq!(stem_for_key("x-61"), "x-782d3631");
    }

    #[test]
    fn test_key_for_stem_decodes_hex_names() {
        assert_eq!(key_for_stem("x-612f62"), "a/b");
        assert_eq!(key_for_stem("Cat"), "Cat");
        assert_eq!(key_for_stem("x-zz"), "x-zz");
    }

    // ===================
    // Victim selection tests
    // ===================

    #[test]
    fn test_choose_victims_returns_distinct_in_range_indices() {
        let mut rng = StdRng::seed_from_u64(42);
        let victims = choose_victims(20, 8, |lo, hi| rng.gen_range(lo..hi));
        assert_eq!(victims.len(), 8);
        let unique: HashSet<_> = victims.iter().copied().collect();
        assert_eq!(unique.len(), 8);
        assert!(victims.iter().all(|&i| i < 20));
    }

    #[test]
    fn test_choose_victims_caps_delta_at_len() {
        let victims = choose_victims(3, 10, |lo, _| lo);
        assert_eq!(victims, vec![0, 1, 2]);
        assert!(choose_victims(0, 4, |lo, _| lo).is_empty());
    }

    #[test]
    fn test_choose_victims_clamps_bad_picks() {
        let victims = choose_victims(5, 2, |_, _| 99);
        assert_eq!(victims, vec![4, 0]);
    }

    // ===================
    // get / put tests
    // ===================

    #[test]
    fn test_get_missing_key_is_miss() {
        let dir = TempDir::new().unwrap();
        let cache = seeded_cache(&dir, CacheLimit::Bounded(10));
        assert_eq!(cache.get::<Vec<String>>("nothing"), None);
    }

    #[test]
    fn test_put_then_get() {
        let dir = TempDir::new().unwrap();
        let mut cache = seeded_cache(&dir, CacheLimit::Bounded(10));
        cache.put("cat", &vec!["feline".to_string()]).unwrap();
        assert_eq!(
            cache.get::<Vec<String>>("cat"),
            Some(vec!["feline".to_string()])
        );
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let dir = TempDir::new().unwrap();
        let mut cache = seeded_cache(&dir, CacheLimit::Bounded(10));
        cache.put("Polish", &1u32).unwrap();
        assert_eq!(cache.get::<u32>("polish"), None);
    }

    #[test]
    fn test_put_overwrites_existing_record() {
        let dir = TempDir::new().unwrap();
        let mut cache = seeded_cache(&dir, CacheLimit::Bounded(10));
        cache.put("cat", &1u32).unwrap();
        cache.put("cat", &2u32).unwrap();
        assert_eq!(cache.get::<u32>("cat"), Some(2));
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[test]
    fn test_corrupt_record_is_removed_on_read() {
        let dir = TempDir::new().unwrap();
        let cache = seeded_cache(&dir, CacheLimit::Bounded(10));
        fs::write(cache.record_path("cat"), b"{not json").unwrap();

        assert_eq!(cache.get::<Vec<String>>("cat"), None);
        assert!(!cache.record_path("cat").exists());
        assert!(cache.entries().unwrap().is_empty());
    }

    #[test]
    fn test_record_of_wrong_shape_counts_as_corrupt() {
        let dir = TempDir::new().unwrap();
        let mut cache = seeded_cache(&dir, CacheLimit::Bounded(10));
        cache.put("cat", &"a string").unwrap();
        assert_eq!(cache.get::<Vec<u32>>("cat"), None);
        assert!(!cache.record_path("cat").exists());
    }

    #[test]
    fn test_disabled_cache_does_not_write() {
        let dir = TempDir::new().unwrap();
        let mut cache = seeded_cache(&dir, CacheLimit::Bounded(0));
        cache.put("cat", &1u32).unwrap();
        assert!(cache.is_empty().unwrap());
    }

    #[test]
    fn test_no_persist_mode_does_not_write() {
        let dir = TempDir::new().unwrap();
        let mut cache = seeded_cache(&dir, CacheLimit::Bounded(10)).with_persist(false);
        cache.put("cat", &1u32).unwrap();
        assert!(cache.is_empty().unwrap());
    }

    #[test]
    fn test_put_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let mut cache = ResultCache::new(&nested, CacheLimit::Bounded(3));
        cache.put("cat", &1u32).unwrap();
        assert!(nested.join("cat.json").is_file());
    }

    // ===================
    // trim tests
    // ===================

    #[test]
    fn test_trim_deletes_down_to_limit() {
        let dir = TempDir::new().unwrap();
        let mut cache = seeded_cache(&dir, CacheLimit::Bounded(100));
        fill(&cache, 12);

        assert_eq!(cache.trim(CacheLimit::Bounded(5)).unwrap(), 7);
        assert_eq!(cache.len().unwrap(), 5);
    }

    #[test]
    fn test_trim_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut cache = seeded_cache(&dir, CacheLimit::Bounded(100));
        fill(&cache, 12);

        cache.trim(CacheLimit::Bounded(4)).unwrap();
        assert_eq!(cache.trim(CacheLimit::Bounded(4)).unwrap(), 0);
        assert_eq!(cache.len().unwrap(), 4);
    }

    #[test]
    fn test_trim_below_count_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut cache = seeded_cache(&dir, CacheLimit::Bounded(100));
        fill(&cache, 3);
        assert_eq!(cache.trim(CacheLimit::Bounded(10)).unwrap(), 0);
        assert_eq!(cache.len().unwrap(), 3);
    }

    #[test]
    fn test_trim_to_zero_empties_cache() {
        let dir = TempDir::new().unwrap();
        let mut cache = seeded_cache(&dir, CacheLimit::Bounded(100));
        fill(&cache, 6);
        assert_eq!(cache.trim(CacheLimit::Bounded(0)).unwrap(), 6);
        assert!(cache.is_empty().unwrap());
    }

    #[test]
    fn test_unbounded_trim_deletes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut cache = seeded_cache(&dir, CacheLimit::Unbounded);
        fill(&cache, 6);
        assert_eq!(cache.trim(CacheLimit::Unbounded).unwrap(), 0);
        assert_eq!(cache.len().unwrap(), 6);
    }

    #[test]
    fn test_trim_on_missing_directory() {
        let dir = TempDir::new().unwrap();
        let mut cache = ResultCache::new(dir.path().join("absent"), CacheLimit::Bounded(1));
        assert_eq!(cache.trim(CacheLimit::Bounded(0)).unwrap(), 0);
    }

    #[test]
    fn test_entries_ignore_foreign_files() {
        let dir = TempDir::new().unwrap();
        let cache = seeded_cache(&dir, CacheLimit::Bounded(10));
        fill(&cache, 2);
        fs::write(dir.path().join("notes.txt"), b"hi").unwrap();
        fs::create_dir(dir.path().join("sub.json")).unwrap();

        let keys: Vec<_> = cache.entries().unwrap().into_iter().map(|e| e.key).collect();
        assert_eq!(keys, vec!["word0", "word1"]);
    }

    #[test]
    fn test_put_at_limit_keeps_count_at_limit() {
        let dir = TempDir::new().unwrap();
        let mut cache = seeded_cache(&dir, CacheLimit::Bounded(10));
        fill(&cache, 12);

        cache.put("fresh", &1u32).unwrap();

        assert_eq!(cache.len().unwrap(), 10);
        assert_eq!(cache.get::<u32>("fresh"), Some(1));
    }

    // ===================
    // CacheLimit tests
    // ===================

    #[test]
    fn test_cache_limit_from_str() {
        assert_eq!("25".parse::<CacheLimit>(), Ok(CacheLimit::Bounded(25)));
        assert_eq!("Unbounded".parse::<CacheLimit>(), Ok(CacheLimit::Unbounded));
        assert!("-1".parse::<CacheLimit>().is_err());
    }
}
