// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cache of directory group memberships.

use std::collections::HashSet;
use std::time::Duration;

use super::ttl::{CacheStats, Cached, TtlCache};

/// Key prefix for per-user group sets.
pub const GROUPS_KEY_PREFIX: &str = "groups_";

/// Reserved key for the directory-wide group listing. Cannot collide with a
/// per-user key because those always carry [`GROUPS_KEY_PREFIX`].
pub const ALL_GROUPS_KEY: &str = "all_groups";

/// Subject key -> set of group names.
///
/// An empty set is a valid cached answer, distinct from "not queried yet".
#[derive(Debug)]
pub struct GroupCache {
    inner: TtlCache<HashSet<String>>,
}

impl GroupCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner: TtlCache::new("groups", max_entries, ttl),
        }
    }

    pub fn user_key(username: &str) -> String {
        format!("{GROUPS_KEY_PREFIX}{username}")
    }

    pub fn get_user_groups(&self, username: &str) -> Option<Cached<HashSet<String>>> {
        self.inner.get(&Self::user_key(username))
    }

    pub fn put_user_groups(&self, username: &str, groups: HashSet<String>) {
        self.inner.put(Self::user_key(username), groups);
    }

    pub fn get_all_groups(&self) -> Option<Cached<HashSet<String>>> {
        self.inner.get(ALL_GROUPS_KEY)
    }

    pub fn put_all_groups(&self, groups: HashSet<String>) {
        self.inner.put(ALL_GROUPS_KEY, groups);
    }

    pub fn invalidate_user(&self, username: &str) -> bool {
        self.inner.invalidate(&Self::user_key(username))
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

    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }
}
