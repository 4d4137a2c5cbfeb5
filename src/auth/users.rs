// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read-only user and role listing for the host.
//!
//! Complements [`DirectoryRealm`](super::DirectoryRealm): the realm answers
//! "may this user log in, and with which roles", the user manager answers
//! "which users and roles exist". Users come back with their mapped roles
//! filled in. Listing calls are never cached; role resolution goes through
//! the group cache.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use tracing::{debug, error};

use super::authenticator::CachingAuthenticator;
use super::error::AuthError;
use super::realm::REALM_NAME;
use super::roles::RoleMapping;
use crate::directory::{RemoteGroup, RemoteIdentity, UserSearchCriteria};

/// Source tag attached to every user and role handed to the host.
pub const USER_SOURCE: &str = "Crowd";

/// A directory user with resolved host roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedUser {
    pub identity: RemoteIdentity,
    pub source: &'static str,
    pub roles: BTreeSet<String>,
}

/// A directory group exposed to the host as a role.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DirectoryRole {
    pub role_id: String,
    pub name: String,
    pub description: Option<String>,
    pub source: &'static str,
}

impl From<RemoteGroup> for DirectoryRole {
    fn from(group: RemoteGroup) -> Self {
        Self {
            role_id: group.name.clone(),
            name: group.name,
            description: group.description,
            source: USER_SOURCE,
        }
    }
}

/// Directory-backed user and role manager.
pub struct DirectoryUserManager {
    authenticator: Arc<CachingAuthenticator>,
    role_mapping: RoleMapping,
}

impl DirectoryUserManager {
    pub fn new(authenticator: Arc<CachingAuthenticator>, role_mapping: RoleMapping) -> Self {
        Self {
            authenticator,
            role_mapping,
        }
    }

    pub fn source(&self) -> &'static str {
        USER_SOURCE
    }

    /// Realm that authenticates the users listed here.
    pub fn authentication_realm_name(&self) -> &'static str {
        REALM_NAME
    }

    /// One user with roles. Lookup failures are reported as not found.
    pub async fn get_user(&self, user_id: &str) -> Result<ManagedUser, AuthError> {
        match self.authenticator.find_user(user_id).await {
            Ok(Some(identity)) => Ok(self.complete(identity).await),
            Ok(None) => Err(AuthError::UserNotFound(user_id.to_string())),
            Err(err) => {
                debug!(user_id, error = %err, "Unable to look up user");
                Err(AuthError::UserNotFound(user_id.to_string()))
            }
        }
    }

    /// Login names of every listed user; empty if the directory fails.
    pub async fn list_user_ids(&self) -> HashSet<String> {
        self.authenticator
            .find_all_usernames()
            .await
            .unwrap_or_else(|err| {
                error!(error = %err, "Unable to list user ids");
                HashSet::new()
            })
    }

    pub async fn list_users(&self) -> Vec<ManagedUser> {
        self.search_users(&UserSearchCriteria::default()).await
    }

    /// Users matching `criteria`, with roles; empty if the directory fails.
    pub async fn search_users(&self, criteria: &UserSearchCriteria) -> Vec<ManagedUser> {
        let identities = match self.authenticator.search_users(criteria).await {
            Ok(identities) => identities,
            Err(err) => {
                error!(error = %err, "Unable to get user list");
                return Vec::new();
            }
        };

        let mut users = Vec::with_capacity(identities.len());
        for identity in identities {
            users.push(self.complete(identity).await);
        }
        users
    }

    /// A single role by id (the directory group name).
    pub async fn get_role(&self, role_id: &str) -> Result<DirectoryRole, AuthError> {
        match self.authenticator.find_group(role_id).await {
            Ok(Some(group)) => Ok(group.into()),
            Ok(None) => Err(AuthError::RoleNotFound(role_id.to_string())),
            Err(err) => {
                debug!(role_id, error = %err, "Unable to look up role");
                Err(AuthError::RoleNotFound(role_id.to_string()))
            }
        }
    }

    /// Every directory group as a role, sorted by id.
    pub async fn list_roles(&self) -> Vec<DirectoryRole> {
        let mut roles: Vec<DirectoryRole> = self
            .authenticator
            .find_all_groups()
            .await
            .into_iter()
            .map(|name| RemoteGroup::new(name).into())
            .collect();
        roles.sort();
        roles
    }

    async fn complete(&self, identity: RemoteIdentity) -> ManagedUser {
        let groups = self.authenticator.find_groups(&identity.user_id).await;
        ManagedUser {
            roles: self.role_mapping.map_groups(&groups),
            source: USER_SOURCE,
            identity,
        }
    }
}
