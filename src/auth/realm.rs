// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Host-facing realm adapter.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};

use super::authenticator::{Authenticator, GroupResolver};
use super::error::AuthError;
use super::password::Password;
use super::roles::RoleMapping;

/// Realm name reported to the host.
pub const REALM_NAME: &str = "CrowdAuthenticatingRealm";

/// Credentials presented by the host.
#[derive(Debug, Clone)]
pub enum AuthenticationToken {
    UsernamePassword { username: String, password: Password },
    /// Any other credential kind, identified by name. Always refused.
    Other(String),
}

impl AuthenticationToken {
    pub fn username_password(username: impl Into<String>, password: impl Into<Password>) -> Self {
        AuthenticationToken::UsernamePassword {
            username: username.into(),
            password: password.into(),
        }
    }

    fn kind(&self) -> &str {
        match self {
            AuthenticationToken::UsernamePassword { .. } => "username_password",
            AuthenticationToken::Other(kind) => kind,
        }
    }
}

/// Successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationInfo {
    pub principal: String,
    pub realm: &'static str,
}

/// Roles granted to a principal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationInfo {
    pub roles: BTreeSet<String>,
}

/// Realm backed by an [`Authenticator`] and a [`GroupResolver`].
pub struct DirectoryRealm {
    authenticator: Arc<dyn Authenticator>,
    groups: Arc<dyn GroupResolver>,
    role_mapping: RoleMapping,
}

impl DirectoryRealm {
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        groups: Arc<dyn GroupResolver>,
        role_mapping: RoleMapping,
    ) -> Self {
        Self {
            authenticator,
            groups,
            role_mapping,
        }
    }

    pub fn name(&self) -> &'static str {
        REALM_NAME
    }

    /// Authenticate a token.
    ///
    /// Every failed login maps to [`AuthError::InvalidCredentials`].
    pub async fn authentication_info(
        &self,
        token: AuthenticationToken,
    ) -> Result<AuthenticationInfo, AuthError> {
        let (username, password) = match token {
            AuthenticationToken::UsernamePassword { username, password } => (username, password),
            other => return Err(AuthError::UnsupportedToken(other.kind().to_string())),
        };

        if username.trim().is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        if self.authenticator.authenticate(&username, password).await {
            Ok(AuthenticationInfo {
                principal: username,
                realm: REALM_NAME,
            })
        } else {
            info!(username = %username, "Login rejected");
            Err(AuthError::InvalidCredentials)
        }
    }

    /// Roles for an authenticated principal.
    pub async fn authorization_info(&self, principal: &str) -> AuthorizationInfo {
        let groups = self.groups.find_groups(principal).await;
        let roles = self.role_mapping.map_groups(&groups);
        debug!(principal, groups = groups.len(), roles = roles.len(), "Resolved roles");
        AuthorizationInfo { roles }
    }
}
