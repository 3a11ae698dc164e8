//! Configuration
//!
//! All runtime options live in one [`DefineConfig`] that is built once at
//! startup and handed to the cache, the resolver and the session.
//!
//! # Configuration Priority
//!
//! Values are applied with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! The file lives at `$XDG_CONFIG_HOME/define/config.toml` (typically
//! `~/.config/define/config.toml`).
//!
//! # Example Configuration
//!
//! ```toml
//! [cache]
//! dir = "/home/me/.cache/define"
//! limit = 500            # or "unbounded"; 0 disables the cache
//! bypass = false
//! write = true
//!
//! [display]
//! verbose = true
//! max_meanings = 5
//!
//! [resolver]
//! base_url = "https://api.dictionaryapi.dev/api/v2/entries/en"
//! timeout_secs = 10
//!
//! [session]
//! max_input_len = 32
//! ```
//!
//! # Environment Variables
//!
//! - `DEFINE_CACHE_DIR`, `DEFINE_CACHE_LIMIT`
//! - `DEFINE_NO_CACHE`, `DEFINE_NO_WRITE`, `DEFINE_VERBOSE` ("1" or "true")
//! - `DEFINE_RESOLVER_URL`, `DEFINE_MAX_INPUT`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::{CacheLimit, ResultCache};
use crate::format::DisplayOptions;
use crate::resolver::FreeDictionaryResolver;

/// Default request timeout for resolvers
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default input buffer length in the interactive session
const DEFAULT_MAX_INPUT_LEN: usize = 32;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Cache settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    /// Directory holding cache records
    pub dir: PathBuf,
    /// Entry limit
    pub limit: CacheLimit,
    /// Ignore cached records when looking up
    pub bypass: bool,
    /// Store new results (false = "do not persist" mode)
    pub persist: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            limit: CacheLimit::default(),
            bypass: false,
            persist: true,
        }
    }
}

impl CacheConfig {
    /// Build the cache these settings describe
    pub fn build(&self) -> ResultCache {
        ResultCache::new(&self.dir, self.limit).with_persist(self.persist)
    }
}

/// Resolver settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Endpoint words are appended to
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_url: FreeDictionaryResolver::DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Interactive session settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Maximum number of characters in the input buffer
    pub max_input_len: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_input_len: DEFAULT_MAX_INPUT_LEN,
        }
    }
}

/// Complete runtime configuration
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DefineConfig {
    pub cache: CacheConfig,
    pub display: DisplayOptions,
    pub resolver: ResolverConfig,
    pub session: SessionConfig,
}

/// Values given on the command line; `None` leaves the setting alone
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub verbose: Option<bool>,
    pub first_five: Option<bool>,
    pub bypass_cache: Option<bool>,
    pub no_write: Option<bool>,
    pub cache_dir: Option<PathBuf>,
    pub cache_limit: Option<CacheLimit>,
}

impl DefineConfig {
    /// Load from the default config file (if present) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match default_config_path() {
            Some(path) if path.is_file() => Self::load_from_path(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file on top of the defaults
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse TOML text on top of the defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: DefineToml = toml::from_str(content)?;
        let mut config = Self::default();
        config.apply_toml(file)?;
        Ok(config)
    }

    /// Apply environment variables, read through `var`
    pub fn apply_env<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = var("DEFINE_CACHE_DIR") {
            self.cache.dir = PathBuf::from(dir);
        }
        if let Some(limit) = var("DEFINE_CACHE_LIMIT") {
            self.cache.limit = limit.parse().map_err(|e| {
                ConfigError::ValidationError(format!("DEFINE_CACHE_LIMIT: {e}"))
            })?;
        }
        if let Some(v) = var("DEFINE_NO_CACHE") {
            self.cache.bypass = is_truthy(&v);
        }
        if let Some(v) = var("DEFINE_NO_WRITE") {
            self.cache.persist = !is_truthy(&v);
        }
        if let Some(v) = var("DEFINE_VERBOSE") {
            self.display.verbose = is_truthy(&v);
        }
        if let Some(url) = var("DEFINE_RESOLVER_URL") {
            self.resolver.base_url = url;
        }
        if let Some(len) = var("DEFINE_MAX_INPUT") {
            self.session.max_input_len = len.parse().map_err(|_| {
                ConfigError::ValidationError(format!("DEFINE_MAX_INPUT: not a number: {len:?}"))
            })?;
        }
        Ok(())
    }

    /// Apply command-line values
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(verbose) = overrides.verbose {
            self.display.verbose = verbose;
        }
        if overrides.first_five == Some(true) {
            self.display = self.display.clone().first_five();
        }
        if let Some(bypass) = overrides.bypass_cache {
            self.cache.bypass = bypass;
        }
        if let Some(no_write) = overrides.no_write {
            self.cache.persist = !no_write;
        }
        if let Some(dir) = &overrides.cache_dir {
            self.cache.dir = dir.clone();
        }
        if let Some(limit) = overrides.cache_limit {
            self.cache.limit = limit;
        }
    }

    /// Check values that the rest of the program relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.max_input_len == 0 {
            return Err(ConfigError::ValidationError(
                "session.max_input_len must be at least 1".to_string(),
            ));
        }
        if self.resolver.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "resolver.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Where the interactive session writes its log
    pub fn log_path(&self) -> PathBuf {
        self.cache.dir.with_file_name("define.log")
    }

    fn apply_toml(&mut self, file: DefineToml) -> Result<(), ConfigError> {
        let DefineToml {
            cache,
            display,
            resolver,
            session,
        } = file;

        if let Some(dir) = cache.dir {
            self.cache.dir = dir;
        }
        if let Some(limit) = cache.limit {
            self.cache.limit = limit.into_limit()?;
        }
        if let Some(bypass) = cache.bypass {
            self.cache.bypass = bypass;
        }
        if let Some(write) = cache.write {
            self.cache.persist = write;
        }

        if let Some(verbose) = display.verbose {
            self.display.verbose = verbose;
        }
        if display.max_meanings.is_some() {
            self.display.max_meanings = display.max_meanings;
        }

        if let Some(base_url) = resolver.base_url {
            self.resolver.base_url = base_url;
        }
        if let Some(timeout) = resolver.timeout_secs {
            self.resolver.timeout_secs = timeout;
        }

        if let Some(len) = session.max_input_len {
            self.session.max_input_len = len;
        }
        Ok(())
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct DefineToml {
    cache: CacheToml,
    display: DisplayToml,
    resolver: ResolverToml,
    session: SessionToml,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct CacheToml {
    dir: Option<PathBuf>,
    limit: Option<LimitToml>,
    bypass: Option<bool>,
    write: Option<bool>,
}

/// `limit = 500` or `limit = "unbounded"`
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum LimitToml {
    Count(usize),
    Keyword(String),
}

impl LimitToml {
    fn into_limit(self) -> Result<CacheLimit, ConfigError> {
        match self {
            Self::Count(n) => Ok(CacheLimit::Bounded(n)),
            Self::Keyword(s) => s
                .parse()
                .map_err(|e| ConfigError::ValidationError(format!("cache.limit: {e}"))),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct DisplayToml {
    verbose: Option<bool>,
    max_meanings: Option<usize>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct ResolverToml {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct SessionToml {
    max_input_len: Option<usize>,
}

// =============================================================================
// Paths
// =============================================================================

/// `$XDG_CONFIG_HOME/define/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("define").join("config.toml"))
}

/// `$XDG_CACHE_HOME/define`, or a temp-dir fallback
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("define"))
        .unwrap_or_else(|| std::env::temp_dir().join("define-cache"))
}

fn is_truthy(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
