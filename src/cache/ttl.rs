// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bounded in-process cache with per-entry time-to-live.
//!
//! Shared by the credential and group caches. Entries expire lazily: a lookup
//! that finds an entry whose age has reached the TTL removes it and reports a
//! miss. [`TtlCache::purge_expired`] sweeps the whole map for callers that
//! want memory back sooner.
//!
//! Lookups never refresh recency, so when the cache is full the entry that
//! was inserted (or last replaced) earliest is evicted first.

use std::num::NonZeroUsize;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lru::LruCache;
use tokio::time::Instant;

/// Stored entry: shared value + insertion timestamp.
struct CacheEntry<V> {
    value: Arc<V>,
    inserted_at: Instant,
}

/// A value read from the cache together with its creation time.
#[derive(Debug)]
pub struct Cached<V> {
    value: Arc<V>,
    created_at: Instant,
}

impl<V> Cached<V> {
    pub fn value(&self) -> &V {
        &self.value
    }

    /// When the entry was written.
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}

impl<V> Clone for Cached<V> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            created_at: self.created_at,
        }
    }
}

impl<V> Deref for Cached<V> {
    type Target = V;

    fn deref(&self) -> &V {
        &self.value
    }
}

/// Point-in-time counters for one cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that found a live entry (what the caller does with it is not tracked here).
    pub hits: u64,
    /// Lookups that found nothing usable (absent or expired).
    pub misses: u64,
    /// Entries dropped because their TTL elapsed.
    pub expirations: u64,
    /// Entries dropped to make room for a new key.
    pub evictions: u64,
    /// Entries currently held (expired ones included until swept).
    pub entries: usize,
    /// Maximum number of entries.
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Thread-safe TTL cache keyed by string.
pub struct TtlCache<V> {
    name: &'static str,
    entries: Mutex<LruCache<String, CacheEntry<V>>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
    evictions: AtomicU64,
}

impl<V> TtlCache<V> {
    /// Create a new cache with the given capacity and TTL.
    ///
    /// - `name`: Label used in log events.
    /// - `capacity`: Max number of keys (a zero capacity is raised to one).
    /// - `ttl`: Time-to-live for each entry, counted from insertion.
    pub fn new(name: &'static str, capacity: usize, ttl: Duration) -> Self {
        Self {
            name,
            entries: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a live entry.
    ///
    /// Returns `None` if not cached or expired (`now - created_at >= ttl`).
    pub fn get(&self, key: &str) -> Option<Cached<V>> {
        let mut entries = self.entries.lock().ok()?;
        let found = entries
            .peek(key)
            .map(|entry| (Arc::clone(&entry.value), entry.inserted_at));

        let Some((value, created_at)) = found else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        };

        if Instant::now().duration_since(created_at) >= self.ttl {
            entries.pop(key);
            self.expirations.fetch_add(1, Ordering::Relaxed);
            self.misses.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(cache = self.name, "Cache entry expired");
            return None;
        }

        self.hits.fetch_add(1, Ordering::Relaxed);
        Some(Cached { value, created_at })
    }

    /// Insert or replace the entry for `key`, stamping it with the current time.
    pub fn put(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let entry = CacheEntry {
            value: Arc::new(value),
            inserted_at: Instant::now(),
        };
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        if let Some((displaced, _)) = entries.push(key.clone(), entry) {
            if displaced != key {
                self.evictions.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    cache = self.name,
                    capacity = entries.cap().get(),
                    "Cache full, evicted oldest entry"
                );
            }
        }
    }

    /// Remove the entry for `key`. Returns whether one was present.
    pub fn invalidate(&self, key: &str) -> bool {
        match self.entries.lock() {
            Ok(mut entries) => entries.pop(key).is_some(),
            Err(_) => false,
        }
    }

    /// Drop every entry.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    /// Remove all expired entries, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let Ok(mut entries) = self.entries.lock() else {
            return 0;
        };
        let now = Instant::now();
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| now.duration_since(entry.inserted_at) >= self.ttl)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            entries.pop(key);
        }
        let removed = expired.len();
        self.expirations
            .fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let (entries, capacity) = self
            .entries
            .lock()
            .map(|entries| (entries.len(), entries.cap().get()))
            .unwrap_or((0, 0));
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entries,
            capacity,
        }
    }
}

impl<V> std::fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("name", &self.name)
            .field("ttl", &self.ttl)
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize, ttl_secs: u64) -> TtlCache<String> {
        TtlCache::new("test", capacity, Duration::from_secs(ttl_secs))
    }

    #[tokio::test(start_paused = true)]
    async fn put_and_get() {
        let cache = cache(10, 300);
        assert!(cache.get("alice").is_none());

        cache.put("alice", "v1".to_string());

        let hit = cache.get("alice").unwrap();
        assert_eq!(hit.value(), "v1");
        assert_eq!(hit.age(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn entry_expires_at_ttl_boundary() {
        let cache = cache(10, 900);
        cache.put("alice", "v1".to_string());

        tokio::time::advance(Duration::from_secs(899)).await;
        assert!(cache.get("alice").is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get("alice").is_none(), "age == ttl counts as expired");
        assert_eq!(cache.len(), 0, "expired entry removed on lookup");
    }

    #[tokio::test(start_paused = true)]
    async fn put_replaces_and_restarts_ttl() {
        let cache = cache(10, 100);
        cache.put("alice", "old".to_string());
        tokio::time::advance(Duration::from_secs(80)).await;

        cache.put("alice", "new".to_string());
        tokio::time::advance(Duration::from_secs(80)).await;

        let hit = cache.get("alice").unwrap();
        assert_eq!(hit.value(), "new");
        assert_eq!(hit.age(), Duration::from_secs(80));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn evicts_oldest_insertion_first() {
        let cache = cache(2, 300);
        cache.put("a", "1".to_string());
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.put("b", "2".to_string());

        // Reading "a" must not protect it from eviction.
        assert!(cache.get("a").is_some());

        cache.put("c", "3".to_string());
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn replacing_a_key_is_not_an_eviction() {
        let cache = cache(2, 300);
        cache.put("a", "1".to_string());
        cache.put("b", "2".to_string());
        cache.put("a", "3".to_string());

        // "a" was rewritten last, so "b" is now the oldest.
        cache.put("c", "4".to_string());
        assert!(cache.get("b").is_none());
        assert_eq!(cache.get("a").unwrap().value(), "3");
        assert_eq!(cache.stats().evictions, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_and_clear() {
        let cache = cache(10, 300);
        cache.put("a", "1".to_string());
        cache.put("b", "2".to_string());

        assert!(cache.invalidate("a"));
        assert!(!cache.invalidate("a"));
        assert!(cache.get("a").is_none());

        cache.clear();
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn purge_expired_only_drops_stale_entries() {
        let cache = cache(10, 60);
        cache.put("old", "1".to_string());
        tokio::time::advance(Duration::from_secs(30)).await;
        cache.put("fresh", "2".to_string());
        tokio::time::advance(Duration::from_secs(30)).await;

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("fresh").is_some());
        assert_eq!(cache.stats().expirations, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stats_track_hits_and_misses() {
        let cache = cache(4, 300);
        cache.get("missing");
        cache.put("a", "1".to_string());
        cache.get("a");
        cache.get("a");

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.capacity, 4);
        assert!((stats.hit_rate() - 2.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let cache = cache(0, 300);
        assert_eq!(cache.stats().capacity, 1);
    }

    #[test]
    fn concurrent_puts_and_gets_keep_whole_entries() {
        let cache = Arc::new(TtlCache::<(u32, u32)>::new(
            "test",
            64,
            Duration::from_secs(300),
        ));
        let handles: Vec<_> = (0..8u32)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..500u32 {
                        cache.put("shared", (i, i));
                        if let Some(hit) = cache.get("shared") {
                            let (a, b) = *hit.value();
                            assert_eq!(a, b, "torn entry observed by thread {t}");
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 1);
    }
}
