//! Pooled matching over a device dataset
//!
//! This crate holds the mutable side of device detection. A [`WorksetPool`]
//! owns a fixed number of [`Workset`]s (per-request scratch buffers sized from
//! the dataset) and hands them out one caller at a time; the signature matcher
//! fills a workset from its input, consulting a shared [`ResultsetCache`]
//! first so repeated inputs skip the node search entirely.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use dataset::demo_utils;
//! use pattern::{MatchMethod, ResultsetCache, WorksetPool};
//!
//! let dataset = Arc::new(demo_utils::sample_dataset("HardwareModel"));
//! let pool = WorksetPool::new(dataset.clone(), Arc::new(ResultsetCache::new(1_000)), 4)
//!     .expect("pool");
//!
//! let mut ws = pool.acquire();
//! ws.set_input(demo_utils::GALAXY_UA);
//! assert_eq!(ws.run_match(), MatchMethod::Exact);
//!
//! ws.set_values(0).expect("hardware profile matched");
//! assert_eq!(dataset.value_name(ws.values()[0]), Some("Galaxy S4"));
//! ```
mod cache;
mod engine;
mod pool;
mod types;
mod workset;

pub use crate::cache::{CacheStats, ResultsetCache};
pub use crate::engine::{match_workset, signature_rank};
pub use crate::pool::{PoolStats, PooledWorkset, WorksetPool};
pub use crate::types::{MatchCounters, MatchMethod, ValueError};
pub use crate::workset::Workset;
