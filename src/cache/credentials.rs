// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cache of salted password hashes from successful directory logins.

use std::time::Duration;

use super::ttl::{CacheStats, Cached, TtlCache};
use crate::auth::hasher::{HASH_LEN, SALT_LEN};

/// Hash and salt of the last password the directory accepted for a user.
///
/// Never holds plaintext. Entries are immutable; a newer login replaces the
/// whole record.
#[derive(Clone, PartialEq, Eq)]
pub struct CachedCredential {
    hash: [u8; HASH_LEN],
    salt: [u8; SALT_LEN],
}

impl CachedCredential {
    pub fn new(hash: [u8; HASH_LEN], salt: [u8; SALT_LEN]) -> Self {
        Self { hash, salt }
    }

    pub fn hash(&self) -> &[u8; HASH_LEN] {
        &self.hash
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }
}

impl std::fmt::Debug for CachedCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedCredential")
            .field("hash", &"[redacted]")
            .field("salt", &"[redacted]")
            .finish()
    }
}

/// Username -> [`CachedCredential`], one entry per username.
#[derive(Debug)]
pub struct CredentialCache {
    inner: TtlCache<CachedCredential>,
}

impl CredentialCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner: TtlCache::new("credentials", max_entries, ttl),
        }
    }

    /// The live credential for `username`, if any.
    pub fn get(&self, username: &str) -> Option<Cached<CachedCredential>> {
        self.inner.get(username)
    }

    /// Store `credential`, replacing any previous one and restarting its TTL.
    pub fn put(&self, username: &str, credential: CachedCredential) {
        self.inner.put(username, credential);
    }

    /// Forget `username` (logout, password reset).
    pub fn invalidate(&self, username: &str) -> bool {
        self.inner.invalidate(username)
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    pub fn purge_expired(&self) -> usize {
        self.inner.purge_expired()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(fill: u8) -> CachedCredential {
        CachedCredential::new([fill; HASH_LEN], [fill; SALT_LEN])
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_user_is_absent() {
        let cache = CredentialCache::new(Duration::from_secs(900), 100);
        assert!(cache.get("nobody").is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn hit_before_ttl_miss_after() {
        let cache = CredentialCache::new(Duration::from_secs(900), 100);
        cache.put("alice", credential(1));

        tokio::time::advance(Duration::from_secs(899)).await;
        let hit = cache.get("alice").expect("still fresh at t=899");
        assert_eq!(hit.hash(), &[1; HASH_LEN]);

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get("alice").is_none(), "expired at t=901");
    }

    #[tokio::test(start_paused = true)]
    async fn put_overwrites_previous_credential() {
        let cache = CredentialCache::new(Duration::from_secs(900), 100);
        cache.put("alice", credential(1));
        cache.put("alice", credential(2));

        assert_eq!(cache.len(), 1);
        let hit = cache.get("alice").unwrap();
        assert_eq!(hit.value(), &credential(2));
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_removes_user() {
        let cache = CredentialCache::new(Duration::from_secs(900), 100);
        cache.put("alice", credential(1));
        assert!(cache.invalidate("alice"));
        assert!(cache.get("alice").is_none());
    }

    #[test]
    fn debug_redacts_secret_material() {
        let rendered = format!("{:?}", credential(7));
        assert!(rendered.contains("redacted"));
        assert!(!rendered.contains('7'));
    }
}
