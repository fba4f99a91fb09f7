//! In-memory TTL cache with a capacity bound and per-key single-flight.
//!
//! Values are stored as `Arc<V>` snapshots and replaced whole, never mutated
//! in place. Readers share a read lock and get a clone of the `Arc`; only
//! inserts, evictions and gate bookkeeping take the write lock.
//!
//! Policies:
//! - Expiry is lazy: a stale entry is evicted when its key is next requested.
//! - Capacity is enforced on insert by evicting the oldest insertion (FIFO).
//!   Refreshing a key counts as a new insertion.
//! - Concurrent misses on the same key are deduplicated: one caller computes,
//!   the others wait on that key's gate and then read the fresh entry. Misses
//!   on different keys compute in parallel.

use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, VecDeque};
use std::convert::Infallible;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// A cached value with its insertion time.
#[derive(Debug)]
pub struct CacheEntry<V> {
    pub value: Arc<V>,
    pub inserted_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) < ttl
    }
}

/// Counters for observing cache behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub len: usize,
}

struct CacheState<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    /// Keys in insertion order; front is the oldest.
    order: VecDeque<K>,
    /// One gate per key currently being computed.
    in_flight: HashMap<K, Arc<Mutex<()>>>,
}

/// Keyed cache with time-to-live and a maximum entry count.
pub struct TtlCache<K, V> {
    name: &'static str,
    ttl: Duration,
    capacity: usize,
    state: RwLock<CacheState<K, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    /// `capacity` is clamped to at least one entry.
    pub fn new(name: &'static str, ttl: Duration, capacity: usize) -> Self {
        Self {
            name,
            ttl,
            capacity: capacity.max(1),
            state: RwLock::new(CacheState {
                entries: HashMap::new(),
                order: VecDeque::new(),
                in_flight: HashMap::new(),
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Return the live entry for `key`, or compute, store and return it.
    pub fn get_or_fetch<F>(&self, key: K, compute: F) -> Arc<V>
    where
        F: FnOnce() -> V,
    {
        match self.get_or_try_fetch::<_, Infallible>(key, || Ok(compute())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Like `get_or_fetch`, but a compute error is returned and nothing is stored.
    pub fn get_or_try_fetch<F, E>(&self, key: K, compute: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.lookup(&key) {
            self.record_hit(&key);
            return Ok(value);
        }

        let gate = self
            .state
            .write()
            .in_flight
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = {
            let _flight = gate.lock();
            // Another caller may have filled the slot while we waited on the gate.
            if let Some(value) = self.lookup(&key) {
                self.record_hit(&key);
                Ok(value)
            } else {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(cache = self.name, ?key, "cache miss");
                compute().map(|value| {
                    let value = Arc::new(value);
                    self.insert(key.clone(), Arc::clone(&value));
                    value
                })
            }
        };

        self.release_gate(&key, &gate);
        result
    }

    /// Live value for `key` without computing. Counts as neither hit nor miss.
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        self.lookup(key)
    }

    /// Drop the entry for `key`, if any.
    pub fn invalidate(&self, key: &K) -> bool {
        let mut state = self.state.write();
        let removed = state.entries.remove(key).is_some();
        if removed {
            state.order.retain(|k| k != key);
        }
        removed
    }

    pub fn clear(&self) {
        let mut state = self.state.write();
        state.entries.clear();
        state.order.clear();
    }

    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            len: self.len(),
        }
    }

    fn record_hit(&self, key: &K) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        debug!(cache = self.name, ?key, "cache hit");
    }

    /// Live value for `key`; evicts the entry if it has expired.
    fn lookup(&self, key: &K) -> Option<Arc<V>> {
        {
            let state = self.state.read();
            let entry = state.entries.get(key)?;
            if entry.is_live(self.ttl, Instant::now()) {
                return Some(Arc::clone(&entry.value));
            }
        }

        let mut state = self.state.write();
        // Re-check: the entry may have been refreshed between the two locks.
        match state.entries.get(key) {
            Some(entry) if entry.is_live(self.ttl, Instant::now()) => {
                return Some(Arc::clone(&entry.value));
            }
            Some(_) => {}
            None => return None,
        }
        state.entries.remove(key);
        state.order.retain(|k| k != key);
        self.evictions.fetch_add(1, Ordering::Relaxed);
        debug!(cache = self.name, ?key, "evicted expired entry");
        None
    }

    fn insert(&self, key: K, value: Arc<V>) {
        let mut state = self.state.write();
        if state.entries.contains_key(&key) {
            state.order.retain(|k| k != &key);
        }
        state.entries.insert(
            key.clone(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
        state.order.push_back(key);

        while state.entries.len() > self.capacity {
            let Some(oldest) = state.order.pop_front() else {
                break;
            };
            if state.entries.remove(&oldest).is_some() {
                self.evictions.fetch_add(1, Ordering::Relaxed);
                debug!(cache = self.name, key = ?oldest, "evicted oldest entry (capacity)");
            }
        }
    }

    /// Remove the key's gate once no other caller holds or waits on it.
    fn release_gate(&self, key: &K, gate: &Arc<Mutex<()>>) {
        let mut state = self.state.write();
        let unused = state
            .in_flight
            .get(key)
            .is_some_and(|g| Arc::ptr_eq(g, gate) && Arc::strong_count(gate) <= 2);
        if unused {
            state.in_flight.remove(key);
        }
    }
}
