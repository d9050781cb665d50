//! Time-expiring revision cache.
//!
//! Entries are checked against the TTL on every lookup, so [`RevisionCache::sweep`]
//! only bounds memory; it never changes what [`RevisionCache::get`] returns.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use outline_core::{RevisionRecord, DEFAULT_CACHE_TTL_SECS};

struct CacheEntry {
    value: RevisionRecord,
    stored_at: Instant,
}

/// Process-lifetime cache of fetched revisions, keyed by revision id.
///
/// Safe to share between concurrent tool calls: every read-check-evict and
/// every store happens under one lock. There is no background timer;
/// expired entries are dropped by `get` or `sweep`.
///
/// # Examples
///
/// ```
/// use outline_core::RevisionRecord;
/// use outline_revisions::cache::RevisionCache;
///
/// let cache = RevisionCache::new();
/// assert!(cache.get("rev1").is_none());
///
/// let rev = RevisionRecord { id: "rev1".into(), ..RevisionRecord::default() };
/// cache.put("rev1", rev.clone());
/// assert_eq!(cache.get("rev1"), Some(rev));
/// ```
pub struct RevisionCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl RevisionCache {
    /// Cache with the default 300 second TTL.
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(DEFAULT_CACHE_TTL_SECS))
    }

    /// Cache with a custom TTL. A zero TTL caches nothing.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached revision if it was stored less than one TTL ago.
    ///
    /// An expired entry is removed and reported as absent, exactly like an
    /// id that was never stored.
    pub fn get(&self, id: &str) -> Option<RevisionRecord> {
        self.get_at(id, Instant::now())
    }

    /// Store `record` under `id`, replacing any previous entry.
    pub fn put(&self, id: impl Into<String>, record: RevisionRecord) {
        self.put_at(id, record, Instant::now());
    }

    /// Drop every expired entry and return how many were removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// [`Self::get`] evaluated at `now`.
    pub fn get_at(&self, id: &str, now: Instant) -> Option<RevisionRecord> {
        let mut entries = self.entries();
        let fresh = entries.get(id).map(|entry| self.is_fresh(entry, now));
        match fresh {
            Some(true) => {
                tracing::debug!(revision_id = id, "revision cache hit");
                entries.get(id).map(|entry| entry.value.clone())
            }
            Some(false) => {
                entries.remove(id);
                tracing::debug!(revision_id = id, "revision cache entry expired");
                None
            }
            None => None,
        }
    }

    /// [`Self::put`] stamped with `now`.
    pub fn put_at(&self, id: impl Into<String>, record: RevisionRecord, now: Instant) {
        self.entries().insert(
            id.into(),
            CacheEntry {
                value: record,
                stored_at: now,
            },
        );
    }

    /// [`Self::sweep`] evaluated at `now`.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, entry| self.is_fresh(entry, now));
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = entries.len(), "swept revision cache");
        }
        removed
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn is_fresh(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.stored_at) < self.ttl
    }

    // A panic while holding the lock cannot leave a half-written entry.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RevisionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RevisionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevisionCache")
            .field("ttl", &self.ttl)
            .field("len", &self.len())
            .finish()
    }
}
