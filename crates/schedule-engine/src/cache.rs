//! Recompute cache keyed by `(clinician, range, timezone)` and the content of
//! the fetched rows.
//!
//! A stored result is reused only when both the key and the rows match; any
//! change to either triggers a full recomputation. There is no externally
//! bumped refresh counter. The cache holds at most `capacity` entries and
//! evicts the least recently used one when a new entry would exceed it.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::DateRange;
use crate::schedule::ScheduleInputs;

/// Entries kept per cache when no capacity is configured.
pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub clinician_id: String,
    pub range: DateRange,
    /// The zone actually used for resolution (after any fallback).
    pub timezone: String,
}

impl CacheKey {
    pub fn new(clinician_id: impl Into<String>, range: DateRange, timezone: impl Into<String>) -> Self {
        Self {
            clinician_id: clinician_id.into(),
            range,
            timezone: timezone.into(),
        }
    }
}

/// Content hash of a row set. Equal rows in equal order hash equal.
///
/// Only a fast pre-check: the cache confirms a hit by comparing the stored
/// rows, so a hash collision costs a recomputation, never a stale result.
pub fn fingerprint(inputs: &ScheduleInputs) -> u64 {
    let mut hasher = DefaultHasher::new();
    inputs.hash(&mut hasher);
    hasher.finish()
}

#[derive(Debug)]
struct Entry<V> {
    fingerprint: u64,
    inputs: ScheduleInputs,
    value: V,
    last_used: AtomicU64,
}

/// Results of one kind of resolution, shareable across tasks.
#[derive(Debug)]
pub struct ScheduleCache<V> {
    entries: DashMap<CacheKey, Entry<V>>,
    capacity: usize,
    clock: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<V> Default for ScheduleCache<V> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl<V> ScheduleCache<V> {
    /// A cache holding at most `capacity` entries (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity: capacity.max(1),
            clock: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }
}

impl<V: Clone> ScheduleCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key` if it was computed from the same
    /// `inputs`; otherwise run `compute` and store its result.
    pub fn get_or_compute(&self, key: CacheKey, inputs: &ScheduleInputs, compute: impl FnOnce() -> V) -> V {
        self.lookup_or_compute(key, fingerprint(inputs), inputs, compute)
    }

    fn lookup_or_compute(
        &self,
        key: CacheKey,
        fingerprint: u64,
        inputs: &ScheduleInputs,
        compute: impl FnOnce() -> V,
    ) -> V {
        let now = self.clock.fetch_add(1, Ordering::Relaxed);

        if let Some(entry) = self.entries.get(&key) {
            if entry.fingerprint == fingerprint && entry.inputs == *inputs {
                entry.last_used.store(now, Ordering::Relaxed);
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(clinician = %key.clinician_id, range = %key.range, "schedule cache hit");
                return entry.value.clone();
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(clinician = %key.clinician_id, range = %key.range, "schedule cache miss, recomputing");
        let value = compute();
        self.entries.insert(
            key,
            Entry {
                fingerprint,
                inputs: inputs.clone(),
                value: value.clone(),
                last_used: AtomicU64::new(now),
            },
        );
        self.evict_over_capacity();
        value
    }

    fn evict_over_capacity(&self) {
        while self.entries.len() > self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|e| e.value().last_used.load(Ordering::Relaxed))
                .map(|e| e.key().clone());
            let Some(key) = oldest else { break };

            self.entries.remove(&key);
            self.evictions.fetch_add(1, Ordering::Relaxed);
            debug!(clinician = %key.clinician_id, range = %key.range, "schedule cache evicted entry");
        }
    }

    /// Drop every entry for one clinician.
    pub fn invalidate_clinician(&self, clinician_id: &str) {
        self.entries.retain(|key, _| key.clinician_id != clinician_id);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }
}
