// Keyed TTL store for previously fetched API responses.
// Entries expire individually and are evicted lazily on lookup.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

/// A cached response with its expiry bookkeeping.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: DateTime<Utc>,
    ttl_seconds: i64,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl_seconds: i64) -> Self {
        Self {
            value,
            stored_at: Utc::now(),
            ttl_seconds,
        }
    }

    /// An entry is valid iff the time since it was stored does not exceed
    /// its TTL. A zero or negative TTL is never valid.
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        if self.ttl_seconds <= 0 {
            return true;
        }
        now.signed_duration_since(self.stored_at) > Duration::seconds(self.ttl_seconds)
    }
}

/// Diagnostic snapshot of the cache contents.
///
/// `keys` may include entries that are already past their TTL but have not
/// been looked up since expiring; eviction is lazy, so stats reports what is
/// physically held, not what is logically servable.
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
}

/// In-memory store of fetched responses, keyed by caller-built strings, with
/// a per-entry TTL.
///
/// The cache owns its entries exclusively; `get` hands out clones. It never
/// fails: a bad key is just a key that will never hit, and a non-positive
/// TTL stores an entry that is already expired. Expired entries are removed
/// on the `get` that observes them, never by a background sweep, and there
/// is no bound on entry count.
#[derive(Debug)]
pub struct ResponseCache<V> {
    entries: HashMap<String, CacheEntry<V>>,
}

impl<V: Clone> ResponseCache<V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Look up a value. Returns `None` on a miss or when the entry has
    /// expired; an expired entry is dropped as a side effect.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let expired = match self.entries.get(key) {
            None => return None,
            Some(entry) => entry.is_expired(Utc::now()),
        };

        if expired {
            self.entries.remove(key);
            return None;
        }

        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Store a value under `key`, replacing any previous entry and restarting
    /// the expiry clock from now.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl_seconds: i64) {
        self.entries
            .insert(key.into(), CacheEntry::new(value, ttl_seconds));
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            keys: self.entries.keys().cloned().collect(),
        }
    }

    /// Shift an entry's store time into the past to simulate elapsed time.
    #[cfg(test)]
    pub(crate) fn backdate(&mut self, key: &str, seconds: i64) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.stored_at -= Duration::seconds(seconds);
        }
    }
}
