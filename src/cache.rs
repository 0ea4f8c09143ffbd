//! Per-subject entitlement cache with LRU eviction and asymmetric TTL.
//!
//! The cache fronts the subscription store so the hot path rarely performs
//! I/O. TTLs are asymmetric on purpose: a cached "entitled" is served for
//! longer than a cached "not entitled", because a user who just paid
//! expects near-immediate unlock and negative results must revalidate
//! aggressively.
//!
//! The cache is an explicitly constructed instance owned by the engine.
//! Capacity and TTLs are injected at construction, so tests get clean
//! isolation without global resets.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lru::LruCache;

use crate::clock::Clock;

/// A cached entitlement with its expiry instant.
#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    value: bool,
    expires_at: DateTime<Utc>,
}

/// Bounded per-subject cache of entitlement booleans.
///
/// Shared across in-flight requests; the interior mutex guards both the
/// map and the recency order, so concurrent access cannot corrupt either.
/// Each `set` is a single atomic insert — an aborted request never leaves
/// a partially written entry.
pub struct EntitlementCache {
    inner: Mutex<LruCache<String, CacheEntry>>,
    positive_ttl: Duration,
    negative_ttl: Duration,
}

impl EntitlementCache {
    /// Create a cache with the given capacity and TTLs.
    ///
    /// A zero capacity is clamped to one entry. Engines never pass zero
    /// ([`PaygateConfig::validate`](crate::PaygateConfig::validate) rejects
    /// it), but a directly constructed cache still gets a working map.
    pub fn new(capacity: usize, positive_ttl: Duration, negative_ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            positive_ttl,
            negative_ttl,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<String, CacheEntry>> {
        // Entries are plain data; a panic elsewhere cannot leave them in a
        // torn state, so a poisoned lock is recovered rather than spread.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Look up a subject's cached entitlement.
    ///
    /// A hit refreshes the subject's recency. A hit on an expired entry
    /// evicts it and reports a miss.
    pub fn get(&self, subject_id: &str, clock: &dyn Clock) -> Option<bool> {
        let mut cache = self.lock();
        let entry = *cache.get(subject_id)?;
        if clock.now_utc() >= entry.expires_at {
            cache.pop(subject_id);
            return None;
        }
        Some(entry.value)
    }

    /// Cache a subject's entitlement.
    ///
    /// The value itself selects the TTL: `true` gets the positive TTL,
    /// `false` the shorter negative TTL. Inserting a new subject at
    /// capacity evicts exactly the least-recently-used entry first.
    pub fn set(&self, subject_id: &str, value: bool, clock: &dyn Clock) {
        let ttl = if value {
            self.positive_ttl
        } else {
            self.negative_ttl
        };
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::zero());
        let expires_at = clock.now_utc() + ttl;
        self.lock()
            .put(subject_id.to_string(), CacheEntry { value, expires_at });
    }

    /// Number of cached subjects, expired entries included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when no subjects are cached.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;

    const POSITIVE_TTL: Duration = Duration::from_secs(60);
    const NEGATIVE_TTL: Duration = Duration::from_secs(30);

    fn test_cache(capacity: usize) -> EntitlementCache {
        EntitlementCache::new(capacity, POSITIVE_TTL, NEGATIVE_TTL)
    }

    fn test_clock() -> MockClock {
        MockClock::from_rfc3339("2025-06-01T09:00:00Z")
    }

    #[test]
    fn miss_on_unknown_subject() {
        let cache = test_cache(10);
        assert_eq!(cache.get("user-1", &test_clock()), None);
    }

    #[test]
    fn hit_after_set() {
        let cache = test_cache(10);
        let clock = test_clock();
        cache.set("user-1", true, &clock);
        assert_eq!(cache.get("user-1", &clock), Some(true));
        cache.set("user-2", false, &clock);
        assert_eq!(cache.get("user-2", &clock), Some(false));
    }

    #[test]
    fn positive_entry_expires_after_sixty_seconds() {
        let cache = test_cache(10);
        let clock = test_clock();
        cache.set("user-1", true, &clock);

        assert_eq!(cache.get("user-1", &clock.after_seconds(59)), Some(true));
        assert_eq!(cache.get("user-1", &clock.after_seconds(60)), None);
    }

    #[test]
    fn negative_entry_expires_after_thirty_seconds() {
        let cache = test_cache(10);
        let clock = test_clock();
        cache.set("user-1", false, &clock);

        assert_eq!(cache.get("user-1", &clock.after_seconds(29)), Some(false));
        assert_eq!(cache.get("user-1", &clock.after_seconds(30)), None);
    }

    #[test]
    fn expired_entry_is_evicted_on_lookup() {
        let cache = test_cache(10);
        let clock = test_clock();
        cache.set("user-1", false, &clock);
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.get("user-1", &clock.after_seconds(31)), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn overwrite_replaces_value_and_ttl() {
        let cache = test_cache(10);
        let clock = test_clock();
        cache.set("user-1", false, &clock);
        cache.set("user-1", true, &clock);

        // Positive TTL now applies.
        assert_eq!(cache.get("user-1", &clock.after_seconds(45)), Some(true));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn capacity_is_never_exceeded() {
        let cache = test_cache(3);
        let clock = test_clock();
        for i in 0..10 {
            cache.set(&format!("user-{}", i), true, &clock);
            assert!(cache.len() <= 3);
        }
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn zero_capacity_is_clamped_to_one_entry() {
        let cache = test_cache(0);
        let clock = test_clock();
        cache.set("a", true, &clock);
        assert_eq!(cache.get("a", &clock), Some(true));
        cache.set("b", false, &clock);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a", &clock), None);
    }

    #[test]
    fn insert_beyond_capacity_evicts_least_recently_used() {
        let cache = test_cache(3);
        let clock = test_clock();
        cache.set("a", true, &clock);
        cache.set("b", true, &clock);
        cache.set("c", true, &clock);

        // Touch "a" so "b" becomes least recently used.
        assert_eq!(cache.get("a", &clock), Some(true));

        cache.set("d", true, &clock);

        assert_eq!(cache.get("b", &clock), None);
        assert_eq!(cache.get("a", &clock), Some(true));
        assert_eq!(cache.get("c", &clock), Some(true));
        assert_eq!(cache.get("d", &clock), Some(true));
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = test_cache(10);
        let clock = test_clock();
        cache.set("user-1", true, &clock);
        cache.set("user-2", false, &clock);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get("user-1", &clock), None);
    }

    #[test]
    fn shared_across_threads() {
        use std::sync::Arc;

        let cache = Arc::new(test_cache(100));
        let clock = test_clock();

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let cache = Arc::clone(&cache);
                let clock = clock.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        let key = format!("user-{}", (worker * 50 + i) % 120);
                        cache.set(&key, i % 2 == 0, &clock);
                        let _ = cache.get(&key, &clock);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("worker panicked");
        }
        assert!(cache.len() <= 100);
    }
}
