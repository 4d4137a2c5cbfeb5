// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory directory used by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::auth::Password;
use crate::directory::{DirectoryClient, RemoteGroup, RemoteIdentity};
use crate::error::DirectoryError;

/// Scriptable [`DirectoryClient`] that counts every call it receives.
#[derive(Default)]
pub struct StubDirectory {
    passwords: Mutex<HashMap<String, String>>,
    groups: Mutex<HashMap<String, HashSet<String>>>,
    identities: Mutex<HashMap<String, RemoteIdentity>>,
    all_groups: Mutex<Vec<RemoteGroup>>,
    failure: Mutex<Option<DirectoryError>>,
    delay: Mutex<Option<Duration>>,
    auth_calls: AtomicUsize,
    group_calls: AtomicUsize,
    all_group_calls: AtomicUsize,
}

impl StubDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, username: &str, password: &str) -> Self {
        self.set_password(username, password);
        self
    }

    pub fn with_groups(self, username: &str, groups: &[&str]) -> Self {
        self.groups.lock().unwrap().insert(
            username.to_string(),
            groups.iter().map(|g| g.to_string()).collect(),
        );
        self
    }

    /// Register a full user record (searchable by `find_users`).
    pub fn with_identity(self, identity: RemoteIdentity) -> Self {
        self.identities
            .lock()
            .unwrap()
            .insert(identity.user_id.clone(), identity);
        self
    }

    pub fn with_all_groups(self, names: &[&str]) -> Self {
        *self.all_groups.lock().unwrap() = names.iter().map(|n| RemoteGroup::new(*n)).collect();
        self
    }

    /// Change a password on the "server side".
    pub fn set_password(&self, username: &str, password: &str) {
        self.passwords
            .lock()
            .unwrap()
            .insert(username.to_string(), password.to_string());
    }

    /// Make every subsequent call fail with `error` (or succeed again with `None`).
    pub fn fail_with(&self, error: Option<DirectoryError>) {
        *self.failure.lock().unwrap() = error;
    }

    /// Make every subsequent call take `delay` before answering.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }

    pub fn group_calls(&self) -> usize {
        self.group_calls.load(Ordering::SeqCst)
    }

    pub fn all_group_calls(&self) -> usize {
        self.all_group_calls.load(Ordering::SeqCst)
    }

    async fn respond(&self) -> Result<(), DirectoryError> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let failure = self.failure.lock().unwrap().clone();
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DirectoryClient for StubDirectory {
    async fn authenticate(&self, username: &str, password: &Password) -> Result<bool, DirectoryError> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        self.respond().await?;
        let passwords = self.passwords.lock().unwrap();
        Ok(passwords.get(username).map(String::as_str) == Some(password.expose()))
    }

    async fn find_groups(&self, username: &str) -> Result<HashSet<String>, DirectoryError> {
        self.group_calls.fetch_add(1, Ordering::SeqCst);
        self.respond().await?;
        Ok(self
            .groups
            .lock()
            .unwrap()
            .get(username)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_all_groups(&self) -> Result<Vec<RemoteGroup>, DirectoryError> {
        self.all_group_calls.fetch_add(1, Ordering::SeqCst);
        self.respond().await?;
        Ok(self.all_groups.lock().unwrap().clone())
    }

    async fn find_user(&self, username: &str) -> Result<Option<RemoteIdentity>, DirectoryError> {
        self.respond().await?;
        if let Some(identity) = self.identities.lock().unwrap().get(username) {
            return Ok(Some(identity.clone()));
        }
        let known = self.passwords.lock().unwrap().contains_key(username);
        Ok(known.then(|| RemoteIdentity::new(username)))
    }

    async fn find_users(&self) -> Result<Vec<RemoteIdentity>, DirectoryError> {
        self.respond().await?;
        let mut users: Vec<RemoteIdentity> =
            self.identities.lock().unwrap().values().cloned().collect();
        users.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(users)
    }

    async fn find_group(&self, name: &str) -> Result<Option<RemoteGroup>, DirectoryError> {
        self.respond().await?;
        Ok(self
            .all_groups
            .lock()
            .unwrap()
            .iter()
            .find(|group| group.name == name)
            .cloned())
    }
}
