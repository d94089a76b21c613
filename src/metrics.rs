// Metrics hooks for the provider.
//
// A `DetectionMetrics` implementation is attached to one provider with
// `Provider::with_metrics`; every `detect` call then reports its latency and
// outcome. Nothing here depends on a particular metrics backend.
use std::time::Duration;

use pattern::MatchMethod;

/// Metrics observer for detection requests.
pub trait DetectionMetrics: Send + Sync {
    /// Record the outcome of one `detect` call.
    ///
    /// `method` is how the match was made, `latency` the wall-clock time from
    /// pool acquisition to result assembly, and `matched` whether any profile
    /// was found.
    fn record_detection(&self, method: MatchMethod, latency: Duration, matched: bool);

    /// Record time spent blocked on an exhausted workset pool.
    fn record_pool_wait(&self, _waited: Duration) {}
}
