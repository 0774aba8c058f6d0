//! Probe configuration
//!
//! Loaded from YAML (see `ProbeConfig::from_yaml_str`). Every field has a
//! default, so a config file only lists what differs:
//!
//! ```yaml
//! base_url: http://localhost:8080
//! files_path: tests/fixtures/files/
//! move_settle_timeout_ms: 8000
//! tree:
//!   settle_marker: busy
//! ```

use crate::locator::TreeSelectors;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming a config file to load
pub const CONFIG_ENV_VAR: &str = "SHOP_PROBE_CONFIG";

/// Default time allowed for slug generation after naming a taxon (10 seconds)
pub const DEFAULT_SLUG_TIMEOUT_MS: u64 = 10_000;

/// Configuration shared by page objects and fixtures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Base URL the admin pages live under
    pub base_url: String,
    /// Directory image fixtures are attached from; prepended verbatim
    pub files_path: String,
    /// Kernel cache directory; themes are seeded below `_themes/`
    pub cache_dir: PathBuf,
    /// Bound on waiting for a move button's settle marker to clear
    pub move_settle_timeout_ms: u64,
    /// Bound on waiting for the slug to be generated
    pub slug_timeout_ms: u64,
    /// Interval between settle checks
    pub poll_interval_ms: u64,
    /// How the taxon tree is rendered
    pub tree: TreeSelectors,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            files_path: String::new(),
            cache_dir: std::env::temp_dir().join("shop-probe"),
            move_settle_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            slug_timeout_ms: DEFAULT_SLUG_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            tree: TreeSelectors::default(),
        }
    }
}

impl ProbeConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> ProbeResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn load(path: impl AsRef<Path>) -> ProbeResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            ProbeError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Load the file named by `SHOP_PROBE_CONFIG`, or fall back to defaults
    pub fn from_env() -> ProbeResult<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(PathBuf::from(path)),
            None => Ok(Self::default()),
        }
    }

    /// Reject settings no scenario could run with
    pub fn validate(&self) -> ProbeResult<()> {
        if self.move_settle_timeout_ms == 0 {
            return Err(ProbeError::config("move_settle_timeout_ms must be positive"));
        }
        if self.slug_timeout_ms == 0 {
            return Err(ProbeError::config("slug_timeout_ms must be positive"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ProbeError::config("poll_interval_ms must be positive"));
        }
        let blank = self.tree.blank_fields();
        if !blank.is_empty() {
            return Err(ProbeError::config(format!(
                "tree selectors must not be blank: {}",
                blank.join(", ")
            )));
        }
        Ok(())
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the files path
    #[must_use]
    pub fn with_files_path(mut self, path: impl Into<String>) -> Self {
        self.files_path = path.into();
        self
    }

    /// Set the cache directory
    #[must_use]
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Set the move settle timeout
    #[must_use]
    pub const fn with_move_settle_timeout(mut self, timeout_ms: u64) -> Self {
        self.move_settle_timeout_ms = timeout_ms;
        self
    }

    /// Set the slug generation timeout
    #[must_use]
    pub const fn with_slug_timeout(mut self, timeout_ms: u64) -> Self {
        self.slug_timeout_ms = timeout_ms;
        self
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }

    /// Wait options for move settle checks
    #[must_use]
    pub const fn move_settle_wait(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.move_settle_timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }

    /// Wait options for slug generation
    #[must_use]
    pub const fn slug_wait(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.slug_timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }

    /// Absolute URL for a path below the base URL
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
