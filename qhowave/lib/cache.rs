//! Memoization of stationary factors.
//!
//! `φₙ` depends only on `n` and the grid, never on time, so every frame after
//! the first for a given `n` reduces to a phase multiplication.

use std::{
    num::NonZeroUsize,
    sync::{
        Arc,
        atomic::{ AtomicU64, Ordering },
    },
};
use lru::LruCache;
use parking_lot::Mutex;
use crate::{
    grid::{ GridId, SpatialGrid },
    wavefunction::{ Evaluator, QResult, StationaryFactor },
};

type Key = (usize, GridId);

/// Bounded least-recently-used store of stationary factors keyed by quantum
/// number and grid identity.
///
/// Entries are write-once: the lock is released while a factor is computed,
/// and if two threads race on the same key the first insertion wins and both
/// callers receive it.
pub struct SampleCache {
    evaluator: Evaluator,
    entries: Mutex<LruCache<Key, Arc<StationaryFactor>>>,
    computations: AtomicU64,
    hits: AtomicU64,
}

impl SampleCache {
    pub fn new(evaluator: Evaluator, capacity: NonZeroUsize) -> Self {
        Self {
            evaluator,
            entries: Mutex::new(LruCache::new(capacity)),
            computations: AtomicU64::new(0),
            hits: AtomicU64::new(0),
        }
    }

    pub fn evaluator(&self) -> &Evaluator { &self.evaluator }

    /// Return the stationary factor for `n` over `grid`, computing it on a
    /// miss.
    pub fn get_or_compute(&self, grid: &SpatialGrid, n: usize)
        -> QResult<Arc<StationaryFactor>>
    {
        let key: Key = (n, grid.id());
        if let Some(phi) = self.entries.lock().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(phi));
        }

        tracing::debug!(n, grid = ?grid.id(), "computing stationary factor");
        let phi = Arc::new(self.evaluator.stationary(grid, n)?);
        self.computations.fetch_add(1, Ordering::Relaxed);

        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(&key) {
            return Ok(Arc::clone(existing));
        }
        if let Some((evicted, _)) = entries.push(key, Arc::clone(&phi)) {
            if evicted != key {
                tracing::debug!(n = evicted.0, "evicted stationary factor");
            }
        }
        Ok(phi)
    }

    /// Number of factors computed so far, including any lost races.
    pub fn computations(&self) -> u64 {
        self.computations.load(Ordering::Relaxed)
    }

    /// Number of lookups served without computation.
    pub fn hits(&self) -> u64 { self.hits.load(Ordering::Relaxed) }

    /// Number of stored factors.
    pub fn len(&self) -> usize { self.entries.lock().len() }

    pub fn is_empty(&self) -> bool { self.entries.lock().is_empty() }

    pub fn contains(&self, grid: &SpatialGrid, n: usize) -> bool {
        self.entries.lock().contains(&(n, grid.id()))
    }

    /// Drop all stored factors.
    pub fn clear(&self) { self.entries.lock().clear(); }
}
