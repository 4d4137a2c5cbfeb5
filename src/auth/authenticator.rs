// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Caching Authenticator
//!
//! Sits between the realm and the [`DirectoryClient`], answering repeat
//! logins and group lookups from memory.
//!
//! ## Login Flow
//!
//! 1. Caching disabled: go straight to the directory.
//! 2. Cached credential for the user whose salted hash matches: accept, no
//!    directory call.
//! 3. Otherwise ask the directory, bounded by the configured deadline.
//!    Errors and timeouts count as a rejection.
//! 4. Directory accepted: store a freshly salted hash (if caching is enabled).
//! 5. Directory rejected: return `false`. Failures are never cached, and a
//!    stale cached hash is left for TTL expiry or the next successful login.
//!
//! Hash derivation runs on the blocking pool; no lock is held across it or
//! across a directory call.

use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::hasher::PasswordHasher;
use super::password::Password;
use crate::cache::janitor::DEFAULT_SWEEP_INTERVAL;
use crate::cache::{CacheJanitor, CacheStats, Cached, CachedCredential, CredentialCache, GroupCache};
use crate::config::RealmConfig;
use crate::directory::{DirectoryClient, RemoteGroup, RemoteIdentity, UserSearchCriteria};
use crate::error::{DirectoryError, SetupError};

/// Verifies a username/password pair.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// `true` only for a verified login. The password is scrubbed afterwards.
    async fn authenticate(&self, username: &str, password: Password) -> bool;
}

/// Resolves the groups a user belongs to.
#[async_trait]
pub trait GroupResolver: Send + Sync {
    async fn find_groups(&self, username: &str) -> HashSet<String>;
}

/// Counters for both caches.
///
/// `credentials.hits` counts cache lookups that found an entry. Whether the
/// presented password matched it is tracked separately in
/// `verified_cache_logins` and `rejected_cache_lookups`; only the former
/// saved a directory call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthenticatorStats {
    pub credentials: CacheStats,
    pub groups: CacheStats,
    pub verified_cache_logins: u64,
    pub rejected_cache_lookups: u64,
}

impl AuthenticatorStats {
    /// Share of credential lookups answered without the directory.
    pub fn verified_hit_rate(&self) -> f64 {
        let total = self.credentials.hits + self.credentials.misses;
        if total == 0 {
            0.0
        } else {
            self.verified_cache_logins as f64 / total as f64
        }
    }
}

/// Directory-backed authenticator with credential and group caching.
pub struct CachingAuthenticator {
    directory: Arc<dyn DirectoryClient>,
    credentials: Arc<CredentialCache>,
    groups: Arc<GroupCache>,
    hasher: PasswordHasher,
    cache_enabled: bool,
    remote_timeout: Duration,
    sweep_interval: Option<Duration>,
    verified_cache_logins: AtomicU64,
    rejected_cache_lookups: AtomicU64,
}

impl CachingAuthenticator {
    /// Build an authenticator (and its caches) from configuration.
    ///
    /// Fails if the configuration does not validate or the system random
    /// source is unusable.
    pub fn new(directory: Arc<dyn DirectoryClient>, config: &RealmConfig) -> Result<Self, SetupError> {
        config.validate()?;

        let credentials = Arc::new(CredentialCache::new(
            config.credential_ttl(),
            config.max_cache_entries,
        ));
        let groups = Arc::new(GroupCache::new(
            config.group_ttl(),
            config.group_cache_capacity(),
        ));

        info!(
            cache_enabled = config.cache_enabled,
            credential_ttl_secs = config.credential_ttl_seconds,
            group_ttl_secs = config.group_ttl_seconds,
            max_entries = config.max_cache_entries,
            max_group_entries = config.group_cache_capacity(),
            "Caching authenticator configured"
        );

        Ok(Self::from_parts(directory, credentials, groups, PasswordHasher::new()?)
            .with_cache_enabled(config.cache_enabled)
            .with_remote_timeout(config.timeouts().total())
            .with_sweep_interval(config.sweep_interval()))
    }

    /// Assemble from existing caches. Caching starts enabled.
    pub fn from_parts(
        directory: Arc<dyn DirectoryClient>,
        credentials: Arc<CredentialCache>,
        groups: Arc<GroupCache>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            directory,
            credentials,
            groups,
            hasher,
            cache_enabled: true,
            remote_timeout: crate::config::DirectoryTimeouts::default().total(),
            sweep_interval: Some(DEFAULT_SWEEP_INTERVAL),
            verified_cache_logins: AtomicU64::new(0),
            rejected_cache_lookups: AtomicU64::new(0),
        }
    }

    /// Enable or disable credential caching. Group caching is unaffected.
    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Set the deadline for a single directory call.
    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    /// Interval for [`janitor`](Self::janitor); `None` disables sweeping.
    pub fn with_sweep_interval(mut self, interval: Option<Duration>) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    pub fn remote_timeout(&self) -> Duration {
        self.remote_timeout
    }

    /// Verify a login, consulting the credential cache first.
    pub async fn authenticate(&self, username: &str, password: Password) -> bool {
        if self.cache_enabled {
            if let Some(cached) = self.credentials.get(username) {
                if self.verify_cached(cached, password.clone()).await {
                    self.verified_cache_logins.fetch_add(1, Ordering::Relaxed);
                    debug!(username, "Authenticated from credential cache");
                    return true;
                }
                self.rejected_cache_lookups.fetch_add(1, Ordering::Relaxed);
                debug!(username, "Cached credential did not match, asking directory");
            }
        }

        let result = self
            .with_deadline(self.directory.authenticate(username, &password))
            .await;

        match result {
            Ok(true) => {
                info!(username, "Authenticated by directory");
                if self.cache_enabled {
                    self.remember(username, password).await;
                }
                true
            }
            Ok(false) => {
                info!(username, "Directory rejected credentials");
                false
            }
            Err(err) => {
                warn!(username, error = %err, "Directory authentication failed");
                false
            }
        }
    }

    /// Like [`authenticate`](Self::authenticate), but gives up as soon as
    /// `cancel` fires. A cancelled attempt returns `false` and writes nothing.
    pub async fn authenticate_or_cancel(
        &self,
        username: &str,
        password: Password,
        cancel: &CancellationToken,
    ) -> bool {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(username, "Authentication cancelled");
                false
            }
            authenticated = self.authenticate(username, password) => authenticated,
        }
    }

    /// Groups for `username`, from cache or directory.
    ///
    /// An empty answer from the directory is cached like any other. A failed
    /// lookup yields an empty set and is not cached.
    pub async fn find_groups(&self, username: &str) -> HashSet<String> {
        if let Some(cached) = self.groups.get_user_groups(username) {
            return cached.value().clone();
        }

        match self.with_deadline(self.directory.find_groups(username)).await {
            Ok(groups) => {
                debug!(username, count = groups.len(), "Fetched groups from directory");
                self.groups.put_user_groups(username, groups.clone());
                groups
            }
            Err(err) => {
                warn!(username, error = %err, "Directory group lookup failed");
                HashSet::new()
            }
        }
    }

    /// Every group name in the directory, cached under the reserved key.
    pub async fn find_all_groups(&self) -> HashSet<String> {
        if let Some(cached) = self.groups.get_all_groups() {
            return cached.value().clone();
        }

        match self.with_deadline(self.directory.find_all_groups()).await {
            Ok(groups) => {
                let names: HashSet<String> = groups.into_iter().map(|g| g.name).collect();
                debug!(count = names.len(), "Fetched all groups from directory");
                self.groups.put_all_groups(names.clone());
                names
            }
            Err(err) => {
                warn!(error = %err, "Directory group listing failed");
                HashSet::new()
            }
        }
    }

    /// Look up a user record. Never cached.
    pub async fn find_user(&self, username: &str) -> Result<Option<RemoteIdentity>, DirectoryError> {
        self.with_deadline(self.directory.find_user(username)).await
    }

    /// Every user the directory exposes. Never cached.
    pub async fn find_users(&self) -> Result<Vec<RemoteIdentity>, DirectoryError> {
        self.with_deadline(self.directory.find_users()).await
    }

    /// Login names of every user the directory exposes.
    pub async fn find_all_usernames(&self) -> Result<HashSet<String>, DirectoryError> {
        let users = self.find_users().await?;
        Ok(users.into_iter().map(|user| user.user_id).collect())
    }

    /// Users matching `criteria`. Never cached.
    pub async fn search_users(
        &self,
        criteria: &UserSearchCriteria,
    ) -> Result<Vec<RemoteIdentity>, DirectoryError> {
        self.with_deadline(self.directory.search_users(criteria)).await
    }

    /// Look up one group by name. Never cached.
    pub async fn find_group(&self, name: &str) -> Result<Option<RemoteGroup>, DirectoryError> {
        self.with_deadline(self.directory.find_group(name)).await
    }

    /// Forget everything cached for one user (e.g. on logout).
    pub fn invalidate_user(&self, username: &str) {
        let credential = self.credentials.invalidate(username);
        let groups = self.groups.invalidate_user(username);
        debug!(username, credential, groups, "Invalidated cached user");
    }

    /// Drop every cached entry (e.g. after a configuration change).
    pub fn clear_caches(&self) {
        self.credentials.clear();
        self.groups.clear();
        info!("Authentication caches cleared");
    }

    pub fn cache_stats(&self) -> AuthenticatorStats {
        AuthenticatorStats {
            credentials: self.credentials.stats(),
            groups: self.groups.stats(),
            verified_cache_logins: self.verified_cache_logins.load(Ordering::Relaxed),
            rejected_cache_lookups: self.rejected_cache_lookups.load(Ordering::Relaxed),
        }
    }

    /// A janitor sweeping this authenticator's caches, unless sweeping is off.
    pub fn janitor(&self) -> Option<CacheJanitor> {
        self.sweep_interval.map(|interval| {
            CacheJanitor::new(self.credentials.clone(), self.groups.clone()).with_interval(interval)
        })
    }

    async fn verify_cached(&self, cached: Cached<CachedCredential>, candidate: Password) -> bool {
        let hasher = self.hasher.clone();
        let verified = tokio::task::spawn_blocking(move || {
            hasher.is_correct(candidate, cached.salt(), cached.hash())
        })
        .await;

        verified.unwrap_or_else(|err| {
            error!(error = %err, "Cached credential verification task failed");
            false
        })
    }

    async fn remember(&self, username: &str, password: Password) {
        let salt = match self.hasher.next_salt() {
            Ok(salt) => salt,
            Err(err) => {
                error!(username, error = %err, "Could not salt credential, not caching");
                return;
            }
        };

        let hasher = self.hasher.clone();
        match tokio::task::spawn_blocking(move || hasher.hash(password, &salt)).await {
            Ok(hash) => {
                self.credentials.put(username, CachedCredential::new(hash, salt));
                debug!(username, "Cached credential");
            }
            Err(err) => error!(username, error = %err, "Credential hashing task failed"),
        }
    }

    async fn with_deadline<T, F>(&self, call: F) -> Result<T, DirectoryError>
    where
        F: Future<Output = Result<T, DirectoryError>>,
    {
        match tokio::time::timeout(self.remote_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(DirectoryError::Timeout(self.remote_timeout)),
        }
    }
}

#[async_trait]
impl Authenticator for CachingAuthenticator {
    async fn authenticate(&self, username: &str, password: Password) -> bool {
        CachingAuthenticator::authenticate(self, username, password).await
    }
}

#[async_trait]
impl GroupResolver for CachingAuthenticator {
    async fn find_groups(&self, username: &str) -> HashSet<String> {
        CachingAuthenticator::find_groups(self, username).await
    }
}

impl std::fmt::Debug for CachingAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingAuthenticator")
            .field("credentials", &self.credentials)
            .field("groups", &self.groups)
            .field("cache_enabled", &self.cache_enabled)
            .field("remote_timeout", &self.remote_timeout)
            .field("sweep_interval", &self.sweep_interval)
            .finish()
    }
}
