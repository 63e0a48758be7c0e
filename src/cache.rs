// src/cache.rs
//
// Single-slot TTL cache for the reconciled corridor record. One corridor,
// one entry: created on the first reconciliation, overwritten whole on every
// later one, never merged and never explicitly destroyed. The engine is the
// only writer.

use std::time::{Duration, Instant};

use tokio::sync::{Mutex, MutexGuard};

use crate::status::ExpressStatus;

#[derive(Debug, Clone)]
struct CacheEntry {
    status: ExpressStatus,
    stored_at: Instant,
}

/// The slot contents, reachable only through [`StatusCache::lock`].
#[derive(Debug, Default)]
pub struct CacheSlot {
    entry: Option<CacheEntry>,
}

impl CacheSlot {
    /// The cached record, if one exists and is younger than `ttl`.
    pub fn fresh(&self, ttl: Duration) -> Option<&ExpressStatus> {
        self.entry
            .as_ref()
            .filter(|e| e.stored_at.elapsed() <= ttl)
            .map(|e| &e.status)
    }

    /// Unconditionally overwrite the slot with a fresh record.
    pub fn store(&mut self, status: ExpressStatus) {
        self.entry = Some(CacheEntry {
            status,
            stored_at: Instant::now(),
        });
    }
}

/// Async-mutex-guarded slot. The engine holds the lock across a refresh,
/// which serializes access in the multi-threaded runtime and collapses
/// concurrent misses into a single in-flight reconciliation.
#[derive(Debug, Default)]
pub struct StatusCache {
    slot: Mutex<CacheSlot>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self) -> MutexGuard<'_, CacheSlot> {
        self.slot.lock().await
    }
}
