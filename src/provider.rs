use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use dataset::DataSet;
use pattern::{CacheStats, PoolStats, ResultsetCache, WorksetPool};
use tracing::{Level, debug, info};

use crate::config::{PropertyFailurePolicy, ProviderConfig};
use crate::error::ProviderError;
use crate::metrics::DetectionMetrics;
use crate::result::{self, MatchResult};

/// Device detection over one dataset.
///
/// A provider owns the workset pool and the resultset cache built for its
/// dataset. It is `Sync`: share it across threads behind an `Arc` or a
/// reference and call [`detect`](Self::detect) concurrently; at most
/// `pool_size` matches run at once and further callers block.
pub struct Provider {
    // Dropped in declaration order: the pool goes before the cache and the
    // dataset it points into.
    pool: WorksetPool,
    cache: Arc<ResultsetCache>,
    dataset: Arc<DataSet>,
    policy: PropertyFailurePolicy,
    metrics: Option<Arc<dyn DetectionMetrics>>,
}

impl Provider {
    /// Open a data file with the default cache and pool sizes.
    pub fn open(
        data_file: impl AsRef<Path>,
        required_properties: &str,
    ) -> Result<Self, ProviderError> {
        Self::new(&ProviderConfig::new(
            data_file.as_ref(),
            required_properties,
        ))
    }

    /// Load the configured data file and build the pool and cache for it.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        config.validate()?;
        let dataset = DataSet::from_file(&config.data_file, &config.required_properties)?;
        Self::from_dataset(Arc::new(dataset), config)
    }

    /// Build a provider over an already loaded dataset.
    ///
    /// `config.data_file` and `config.required_properties` are ignored; the
    /// dataset's own required property list applies.
    pub fn from_dataset(
        dataset: Arc<DataSet>,
        config: &ProviderConfig,
    ) -> Result<Self, ProviderError> {
        config.validate()?;
        let cache = Arc::new(ResultsetCache::new(config.cache_size));
        let pool = WorksetPool::new(Arc::clone(&dataset), Arc::clone(&cache), config.pool_size)?;

        info!(
            dataset = dataset.name().unwrap_or("unnamed"),
            version = dataset.version(),
            required_properties = dataset.required_properties().len(),
            signatures = dataset.signatures().len(),
            pool_size = config.pool_size,
            cache_size = config.cache_size,
            "provider_ready"
        );

        Ok(Self {
            pool,
            cache,
            dataset,
            policy: config.on_property_failure,
            metrics: None,
        })
    }

    /// Report every detection to `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<dyn DetectionMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Identify the device behind `user_agent`.
    ///
    /// Returns `None` when no signature resembles the input. Input longer than
    /// the dataset's maximum length is truncated first, which the result
    /// reports through [`MatchResult::input_truncated`].
    pub fn detect(&self, user_agent: &str) -> Option<MatchResult> {
        let span = tracing::span!(Level::DEBUG, "provider.detect", input_len = user_agent.len());
        let _guard = span.enter();
        let start = Instant::now();

        let mut workset = self.pool.acquire();
        if let (Some(metrics), Some(waited)) = (&self.metrics, workset.waited()) {
            metrics.record_pool_wait(waited);
        }

        if workset.set_input(user_agent) {
            debug!(
                input_len = user_agent.len(),
                max_len = workset.max_input_len(),
                "detect_truncated_input"
            );
        }
        let method = workset.run_match();
        let result = result::assemble(&mut workset, &self.dataset, self.policy);
        drop(workset);

        let latency = start.elapsed();
        debug!(
            method = %method,
            matched = result.is_some(),
            elapsed_micros = latency.as_micros(),
            "detect_complete"
        );
        if let Some(metrics) = &self.metrics {
            metrics.record_detection(method, latency, result.is_some());
        }
        result
    }

    /// Detect every input, in parallel on the rayon pool. Output order
    /// matches input order.
    #[cfg(feature = "parallel")]
    pub fn detect_batch<S>(&self, user_agents: &[S]) -> Vec<Option<MatchResult>>
    where
        S: AsRef<str> + Sync,
    {
        use rayon::prelude::*;

        user_agents
            .par_iter()
            .map(|user_agent| self.detect(user_agent.as_ref()))
            .collect()
    }

    /// Detect every input in order.
    #[cfg(not(feature = "parallel"))]
    pub fn detect_batch<S>(&self, user_agents: &[S]) -> Vec<Option<MatchResult>>
    where
        S: AsRef<str> + Sync,
    {
        user_agents
            .iter()
            .map(|user_agent| self.detect(user_agent.as_ref()))
            .collect()
    }

    pub fn dataset(&self) -> &Arc<DataSet> {
        &self.dataset
    }

    pub fn failure_policy(&self) -> PropertyFailurePolicy {
        self.policy
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Log final counters and drop the pool, cache and dataset handle.
    ///
    /// Every [`PooledWorkset`](pattern::PooledWorkset) borrows the pool, so
    /// taking `self` by value means no detection can still be running.
    pub fn close(self) {
        let pool = self.pool.stats();
        debug_assert_eq!(pool.outstanding, 0);
        let cache = self.cache.stats();
        info!(
            acquisitions = pool.acquisitions,
            peak_outstanding = pool.peak_outstanding,
            contended = pool.contended,
            cache_hits = cache.hits,
            cache_misses = cache.misses,
            cache_len = cache.len,
            "provider_closed"
        );
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("dataset", &self.dataset.name())
            .field("pool", &self.pool)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
