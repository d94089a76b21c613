//! Provider configuration
//!
//! A provider is described by a small YAML document. Every field except
//! `data_file` has a default, so the shortest useful file is one line:
//!
//! ```yaml
//! data_file: data/sample.json
//! required_properties: "IsMobile,BrowserName,BrowserVersion"
//! cache_size: 5000
//! pool_size: 10
//! on_property_failure: continue   # or stop_at_first_failure
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default resultset cache capacity.
pub const DEFAULT_CACHE_SIZE: usize = 5000;
/// Default number of pooled worksets.
pub const DEFAULT_POOL_SIZE: usize = 10;
/// Upper bound on `pool_size`; every slot holds a full input buffer.
pub const MAX_POOL_SIZE: usize = 1024;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// What result assembly does when a required property cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyFailurePolicy {
    /// Record the failure and keep resolving the remaining properties.
    #[default]
    Continue,
    /// Record the failure and skip every later property.
    StopAtFirstFailure,
}

/// Everything needed to open a [`Provider`](crate::Provider).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProviderConfig {
    /// Path of the JSON device data file.
    #[serde(default)]
    pub data_file: PathBuf,

    /// Comma separated property names, in output order. Empty selects all.
    #[serde(default)]
    pub required_properties: String,

    /// Resultset cache capacity; `0` disables caching.
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    /// Number of pooled worksets, i.e. the limit on concurrent matches.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    #[serde(default)]
    pub on_property_failure: PropertyFailurePolicy,
}

impl ProviderConfig {
    /// Configuration with default cache and pool sizes.
    pub fn new(data_file: impl Into<PathBuf>, required_properties: impl Into<String>) -> Self {
        Self {
            data_file: data_file.into(),
            required_properties: required_properties.into(),
            cache_size: DEFAULT_CACHE_SIZE,
            pool_size: DEFAULT_POOL_SIZE,
            on_property_failure: PropertyFailurePolicy::default(),
        }
    }

    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.cache_size = cache_size;
        self
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn with_failure_policy(mut self, policy: PropertyFailurePolicy) -> Self {
        self.on_property_failure = policy;
        self
    }

    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: ProviderConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the sizing knobs.
    ///
    /// An empty `data_file` is accepted here and reported by the loader as
    /// `InitError::NotSet`.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.pool_size == 0 {
            return Err(ConfigLoadError::Validation(
                "pool_size must be greater than zero".into(),
            ));
        }
        if self.pool_size > MAX_POOL_SIZE {
            return Err(ConfigLoadError::Validation(format!(
                "pool_size must be at most {MAX_POOL_SIZE}, got {}",
                self.pool_size
            )));
        }
        Ok(())
    }
}

fn default_cache_size() -> usize {
    DEFAULT_CACHE_SIZE
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}
