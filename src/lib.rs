//! uamatch: device detection from user-agent strings
//!
//! The crate ties the workspace together. [`Provider`] loads a device data
//! file into an immutable [`DataSet`], builds a fixed pool of match worksets
//! and an LRU resultset cache for it, and answers [`Provider::detect`] calls
//! from any number of threads.
//!
//! ```text
//! detect(ua) -> pool.acquire() -> set_input (truncate) -> match (cache first)
//!            -> resolve required properties -> MatchResult -> release
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use uamatch::{demo_utils, PropertyValue, Provider, ProviderConfig};
//!
//! let dataset = Arc::new(demo_utils::sample_dataset("IsMobile,BrowserName"));
//! let provider = Provider::from_dataset(dataset, &ProviderConfig::new("", "")).unwrap();
//!
//! let result = provider.detect(demo_utils::GALAXY_UA).expect("known device");
//! assert_eq!(result.id(), "15-38-60");
//! assert_eq!(result.get("IsMobile"), Some(&PropertyValue::Bool(true)));
//!
//! assert!(provider.detect(demo_utils::UNKNOWN_UA).is_none());
//! ```

mod config;
mod error;
mod metrics;
mod provider;
mod result;

pub use crate::config::{
    ConfigLoadError, DEFAULT_CACHE_SIZE, DEFAULT_POOL_SIZE, MAX_POOL_SIZE, PropertyFailurePolicy,
    ProviderConfig,
};
pub use crate::error::ProviderError;
pub use crate::metrics::DetectionMetrics;
pub use crate::provider::Provider;
pub use crate::result::{
    FailureReason, MatchMeta, MatchResult, PropertyFailure, PropertyValue, join_profile_ids,
};

#[doc(hidden)]
pub use dataset::demo_utils;
pub use dataset::{DataSet, InitError, split_property_list};
pub use pattern::{CacheStats, MatchCounters, MatchMethod, PoolStats, ValueError};
