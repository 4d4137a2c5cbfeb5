// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Cache Janitor
//!
//! Optional background task that sweeps expired entries out of the credential
//! and group caches. Lookups already ignore stale entries, so the janitor only
//! bounds how long expired hashes stay resident in memory.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{CredentialCache, GroupCache};

/// Default interval between sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Periodic expired-entry sweeper.
pub struct CacheJanitor {
    credentials: Arc<CredentialCache>,
    groups: Arc<GroupCache>,
    interval: Duration,
}

impl CacheJanitor {
    pub fn new(credentials: Arc<CredentialCache>, groups: Arc<GroupCache>) -> Self {
        Self {
            credentials,
            groups,
            interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run the sweep loop until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(janitor.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Cache janitor starting"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Cache janitor shutting down");
                    return;
                }
            }

            self.sweep();
        }
    }

    /// Execute one sweep over both caches; returns the number of entries dropped.
    pub fn sweep(&self) -> usize {
        let credentials = self.credentials.purge_expired();
        let groups = self.groups.purge_expired();
        if credentials + groups > 0 {
            debug!(credentials, groups, "Cache janitor: purged expired entries");
        }
        credentials + groups
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::auth::hasher::{HASH_LEN, SALT_LEN};
    use crate::cache::CachedCredential;

    fn caches() -> (Arc<CredentialCache>, Arc<GroupCache>) {
        (
            Arc::new(CredentialCache::new(Duration::from_secs(30), 10)),
            Arc::new(GroupCache::new(Duration::from_secs(30), 10)),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_drops_expired_entries_from_both_caches() {
        let (credentials, groups) = caches();
        credentials.put("alice", CachedCredential::new([0; HASH_LEN], [0; SALT_LEN]));
        groups.put_user_groups("alice", HashSet::new());

        let janitor = CacheJanitor::new(credentials.clone(), groups.clone());
        assert_eq!(janitor.sweep(), 0);

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(janitor.sweep(), 2);
        assert!(credentials.is_empty());
        assert!(groups.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn run_sweeps_periodically_and_stops_on_cancel() {
        let (credentials, groups) = caches();
        credentials.put("alice", CachedCredential::new([0; HASH_LEN], [0; SALT_LEN]));

        let shutdown = CancellationToken::new();
        let janitor = CacheJanitor::new(credentials.clone(), groups)
            .with_interval(Duration::from_secs(10));
        let handle = tokio::spawn(janitor.run(shutdown.clone()));

        tokio::time::sleep(Duration::from_secs(45)).await;
        assert!(credentials.is_empty(), "entry swept after it expired");

        shutdown.cancel();
        handle.await.unwrap();
    }
}
