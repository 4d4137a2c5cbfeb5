// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Directory Boundary
//!
//! The realm never talks to the identity directory itself. It consumes a
//! [`DirectoryClient`] supplied by the host, which owns the wire protocol,
//! connection pooling, and transport-level timeouts (see
//! [`DirectoryTimeouts`](crate::config::DirectoryTimeouts)).
//!
//! ## Contract
//!
//! - `authenticate` returns `Ok(false)` for rejected credentials and
//!   `Err(DirectoryError)` for network or protocol trouble. The realm treats
//!   both as a failed login.
//! - `find_groups` returns the user's (nested) group names.
//! - User listing/search and single-group lookups are optional and report
//!   `DirectoryError::Unsupported` unless implemented.
//! - Implementations must abort promptly when their future is dropped.

mod types;

use std::collections::HashSet;

use async_trait::async_trait;

use crate::auth::Password;
use crate::error::DirectoryError;

pub use types::{RemoteGroup, RemoteIdentity, UserSearchCriteria, UserStatus};

/// Remote identity directory.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Verify a username/password pair against the directory.
    async fn authenticate(&self, username: &str, password: &Password)
        -> Result<bool, DirectoryError>;

    /// Group names the user belongs to, including nested memberships.
    async fn find_groups(&self, username: &str) -> Result<HashSet<String>, DirectoryError>;

    /// Every group known to the directory.
    async fn find_all_groups(&self) -> Result<Vec<RemoteGroup>, DirectoryError> {
        Err(DirectoryError::Unsupported("find_all_groups"))
    }

    /// Look up a single user record.
    async fn find_user(&self, _username: &str) -> Result<Option<RemoteIdentity>, DirectoryError> {
        Err(DirectoryError::Unsupported("find_user"))
    }

    /// Every user the directory exposes to this application.
    async fn find_users(&self) -> Result<Vec<RemoteIdentity>, DirectoryError> {
        Err(DirectoryError::Unsupported("find_users"))
    }

    /// Users matching `criteria`.
    ///
    /// Defaults to filtering [`find_users`](Self::find_users) locally;
    /// directories with server-side search should override it.
    async fn search_users(
        &self,
        criteria: &UserSearchCriteria,
    ) -> Result<Vec<RemoteIdentity>, DirectoryError> {
        let users = self.find_users().await?;
        Ok(users.into_iter().filter(|user| criteria.matches(user)).collect())
    }

    /// Look up a single group by name.
    async fn find_group(&self, _name: &str) -> Result<Option<RemoteGroup>, DirectoryError> {
        Err(DirectoryError::Unsupported("find_group"))
    }
}
