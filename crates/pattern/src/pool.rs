use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use dataset::{DataSet, InitError};
use tracing::debug;

use crate::cache::ResultsetCache;
use crate::engine;
use crate::types::{MatchMethod, ValueError};
use crate::workset::Workset;

/// Counters describing pool usage since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub capacity: usize,
    pub available: usize,
    pub outstanding: usize,
    pub peak_outstanding: usize,
    pub acquisitions: u64,
    /// Acquisitions that found the pool empty and had to wait.
    pub contended: u64,
}

#[derive(Debug)]
struct PoolState {
    free: Vec<usize>,
    outstanding: usize,
    peak_outstanding: usize,
    acquisitions: u64,
    contended: u64,
}

impl PoolState {
    fn checkout(&mut self) -> Option<usize> {
        let slot = self.free.pop()?;
        self.outstanding += 1;
        self.peak_outstanding = self.peak_outstanding.max(self.outstanding);
        self.acquisitions += 1;
        Some(slot)
    }
}

/// Fixed set of worksets handed out one request at a time.
///
/// Every workset is created when the pool is built; nothing is allocated on
/// the request path. [`acquire`](Self::acquire) blocks while all worksets are
/// checked out, which makes the pool size the admission limit for concurrent
/// matches. The returned guard gives the workset back when dropped.
///
/// ```
/// use std::sync::Arc;
///
/// use dataset::demo_utils;
/// use pattern::{MatchMethod, ResultsetCache, WorksetPool};
///
/// let dataset = Arc::new(demo_utils::sample_dataset("IsMobile"));
/// let pool = WorksetPool::new(dataset, Arc::new(ResultsetCache::new(100)), 2).unwrap();
///
/// let mut ws = pool.acquire();
/// ws.set_input(demo_utils::IPHONE_UA);
/// assert_eq!(ws.run_match(), MatchMethod::Exact);
/// drop(ws);
/// assert_eq!(pool.stats().available, 2);
/// ```
pub struct WorksetPool {
    dataset: Arc<DataSet>,
    cache: Arc<ResultsetCache>,
    slots: Box<[Mutex<Workset>]>,
    state: Mutex<PoolState>,
    available: Condvar,
    idle: Condvar,
}

impl WorksetPool {
    /// Build `size` worksets for `dataset` up front.
    ///
    /// A zero size is rejected with [`InitError::NotSet`]; a workset buffer
    /// that cannot be reserved yields [`InitError::InsufficientMemory`].
    pub fn new(
        dataset: Arc<DataSet>,
        cache: Arc<ResultsetCache>,
        size: usize,
    ) -> Result<Self, InitError> {
        if size == 0 {
            return Err(InitError::NotSet {
                reason: "workset pool size must be greater than zero".into(),
            });
        }

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(size)
            .map_err(|_| InitError::InsufficientMemory {
                what: "workset pool slots",
                requested: size.saturating_mul(size_of::<Mutex<Workset>>()),
            })?;
        for _ in 0..size {
            slots.push(Mutex::new(Workset::new(&dataset)?));
        }

        debug!(
            size,
            max_input_len = dataset.max_user_agent_length(),
            cache_capacity = cache.capacity(),
            "workset_pool_ready"
        );

        Ok(Self {
            dataset,
            cache,
            slots: slots.into_boxed_slice(),
            state: Mutex::new(PoolState {
                free: (0..size).rev().collect(),
                outstanding: 0,
                peak_outstanding: 0,
                acquisitions: 0,
                contended: 0,
            }),
            available: Condvar::new(),
            idle: Condvar::new(),
        })
    }

    /// Check out a workset, blocking until one is free. There is no timeout.
    pub fn acquire(&self) -> PooledWorkset<'_> {
        let mut state = lock(&self.state);
        let mut waiting_since: Option<Instant> = None;
        loop {
            if let Some(slot) = state.checkout() {
                drop(state);
                return self.guard(slot, waiting_since.map(|since| since.elapsed()));
            }
            if waiting_since.is_none() {
                state.contended += 1;
                debug!(capacity = self.slots.len(), "pool_exhausted");
                waiting_since = Some(Instant::now());
            }
            state = self
                .available
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Check out a workset if one is free right now.
    pub fn try_acquire(&self) -> Option<PooledWorkset<'_>> {
        let slot = lock(&self.state).checkout()?;
        Some(self.guard(slot, None))
    }

    /// Return a workset explicitly. Dropping the guard does the same.
    pub fn release(&self, workset: PooledWorkset<'_>) {
        debug_assert!(std::ptr::eq(workset.pool, self), "workset released to a foreign pool");
        drop(workset);
    }

    /// Block until every workset has been returned.
    pub fn wait_idle(&self) {
        let _state = self
            .idle
            .wait_while(lock(&self.state), |state| state.outstanding > 0)
            .unwrap_or_else(PoisonError::into_inner);
    }

    pub fn stats(&self) -> PoolStats {
        let state = lock(&self.state);
        PoolStats {
            capacity: self.slots.len(),
            available: state.free.len(),
            outstanding: state.outstanding,
            peak_outstanding: state.peak_outstanding,
            acquisitions: state.acquisitions,
            contended: state.contended,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn dataset(&self) -> &Arc<DataSet> {
        &self.dataset
    }

    pub fn cache(&self) -> &Arc<ResultsetCache> {
        &self.cache
    }

    fn guard(&self, slot: usize, waited: Option<Duration>) -> PooledWorkset<'_> {
        PooledWorkset {
            pool: self,
            slot,
            waited,
            workset: Some(lock(&self.slots[slot])),
        }
    }

    fn give_back(&self, slot: usize) {
        let mut state = lock(&self.state);
        state.free.push(slot);
        state.outstanding -= 1;
        let idle = state.outstanding == 0;
        drop(state);

        self.available.notify_one();
        if idle {
            self.idle.notify_all();
        }
    }
}

impl std::fmt::Debug for WorksetPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorksetPool")
            .field("stats", &self.stats())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

/// Exclusive handle on one pooled workset.
///
/// Dereferences to [`Workset`]. The workset goes back to its pool when the
/// guard is dropped, including during unwinding.
pub struct PooledWorkset<'p> {
    pool: &'p WorksetPool,
    slot: usize,
    waited: Option<Duration>,
    workset: Option<MutexGuard<'p, Workset>>,
}

impl PooledWorkset<'_> {
    /// Match the current input against the pool's dataset and cache.
    pub fn run_match(&mut self) -> MatchMethod {
        let pool = self.pool;
        engine::match_workset(&pool.dataset, &pool.cache, self)
    }

    /// Resolve the `required_index`-th required property of the pool's
    /// dataset against the last match.
    pub fn set_values(&mut self, required_index: usize) -> Result<usize, ValueError> {
        let pool = self.pool;
        Workset::set_values(self, &pool.dataset, required_index)
    }

    pub fn signature_rank(&self) -> u32 {
        engine::signature_rank(&self.pool.dataset, self)
    }

    pub fn dataset(&self) -> &DataSet {
        &self.pool.dataset
    }

    /// Index of the slot this workset occupies.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// How long `acquire` blocked, if it had to.
    pub fn waited(&self) -> Option<Duration> {
        self.waited
    }
}

impl Deref for PooledWorkset<'_> {
    type Target = Workset;

    fn deref(&self) -> &Workset {
        self.workset
            .as_deref()
            .expect("workset guard is held until drop")
    }
}

impl DerefMut for PooledWorkset<'_> {
    fn deref_mut(&mut self) -> &mut Workset {
        self.workset
            .as_deref_mut()
            .expect("workset guard is held until drop")
    }
}

impl Drop for PooledWorkset<'_> {
    fn drop(&mut self) {
        // Unlock the slot before it becomes visible as free.
        drop(self.workset.take());
        self.pool.give_back(self.slot);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
