//! Cache store collaborators and the in-memory store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use thiserror::Error;

/// A failure reported by a cache store.
///
/// Never surfaces from a render: the coordinator logs it and treats the
/// entry as a miss.
#[derive(Error, Debug)]
pub enum CacheStoreError {
    /// The store could not be reached.
    #[error("Cache store unavailable: {0}")]
    Unavailable(String),

    /// The store refused an entry.
    #[error("Cache store rejected key '{key}': {reason}")]
    Rejected {
        /// Key of the refused entry
        key: String,
        /// Reason given by the store
        reason: String,
    },

    /// Any other store-specific failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A key/value store holding serialized fragments.
pub trait CacheStore: Send + Sync {
    /// Fetch the fragment stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<String>, CacheStoreError>;

    /// Store `fragment` under `key`, replacing any previous entry.
    fn write(
        &self,
        key: &str,
        fragment: &str,
        expires_in: Option<Duration>,
    ) -> Result<(), CacheStoreError>;

    /// The batched interface, when the store has one.
    fn as_multi(&self) -> Option<&dyn MultiKeyCacheStore> {
        None
    }
}

/// Batched reads and writes.
pub trait MultiKeyCacheStore: CacheStore {
    /// Fetch several keys in one call. Absent keys are missing from the map.
    fn read_multi(&self, keys: &[String]) -> Result<HashMap<String, String>, CacheStoreError>;

    /// Store several entries, best effort.
    ///
    /// Returns the entries that failed; a failure does not stop the others.
    fn write_multi(
        &self,
        entries: Vec<(String, String)>,
        expires_in: Option<Duration>,
    ) -> Vec<(String, CacheStoreError)> {
        entries
            .into_iter()
            .filter_map(|(key, fragment)| {
                self.write(&key, &fragment, expires_in).err().map(|err| (key, err))
            })
            .collect()
    }
}

#[derive(Debug)]
struct Entry {
    fragment: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Counters kept by [`MemoryStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub hits: usize,
    pub misses: usize,
    pub writes: usize,
    /// Number of batched reads, whatever their size.
    pub multi_reads: usize,
}

impl StoreStats {
    /// Hit rate as a percentage of all key lookups.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Process-local fragment store.
///
/// Entries may carry a time-to-live; an expired entry reads as absent and is
/// dropped on access. Supports batched access unless built with
/// [`without_multi_key`](Self::without_multi_key).
#[derive(Debug)]
pub struct MemoryStore {
    entries: DashMap<String, Entry>,
    multi_key: bool,
    hits: AtomicUsize,
    misses: AtomicUsize,
    writes: AtomicUsize,
    multi_reads: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            multi_key: true,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            multi_reads: AtomicUsize::new(0),
        }
    }

    /// A store that only offers single-key access.
    #[must_use]
    pub fn without_multi_key(mut self) -> Self {
        self.multi_key = false;
        self
    }

    /// Number of stored entries, expired ones included until touched.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Drop every entry and reset the counters.
    pub fn clear(&self) {
        self.entries.clear();
        for counter in [&self.hits, &self.misses, &self.writes, &self.multi_reads] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            multi_reads: self.multi_reads.load(Ordering::Relaxed),
        }
    }

    fn lookup(&self, key: &str, now: Instant) -> Option<String> {
        let found = self
            .entries
            .get(key)
            .and_then(|entry| (!entry.is_expired(now)).then(|| entry.fragment.clone()));

        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.entries.remove_if(key, |_, entry| entry.is_expired(now));
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }
}

impl CacheStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, CacheStoreError> {
        Ok(self.lookup(key, Instant::now()))
    }

    fn write(
        &self,
        key: &str,
        fragment: &str,
        expires_in: Option<Duration>,
    ) -> Result<(), CacheStoreError> {
        let entry = Entry {
            fragment: fragment.to_string(),
            expires_at: expires_in.map(|ttl| Instant::now() + ttl),
        };
        self.entries.insert(key.to_string(), entry);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn as_multi(&self) -> Option<&dyn MultiKeyCacheStore> {
        if self.multi_key { Some(self) } else { None }
    }
}

impl MultiKeyCacheStore for MemoryStore {
    fn read_multi(&self, keys: &[String]) -> Result<HashMap<String, String>, CacheStoreError> {
        self.multi_reads.fetch_add(1, Ordering::Relaxed);
        let now = Instant::now();
        Ok(keys
            .iter()
            .filter_map(|key| self.lookup(key, now).map(|fragment| (key.clone(), fragment)))
            .collect())
    }
}
