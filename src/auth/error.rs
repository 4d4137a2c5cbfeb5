// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Realm authentication errors.

/// Error returned to the host by [`DirectoryRealm`](super::DirectoryRealm).
///
/// Deliberately coarse: a failed login never tells the caller whether the
/// username was unknown, the password wrong, or the directory unreachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Login rejected (for any reason)
    InvalidCredentials,
    /// Token kind this realm does not handle
    UnsupportedToken(String),
    /// No such user in the directory (or the lookup failed)
    UserNotFound(String),
    /// No such role in the directory (or the lookup failed)
    RoleNotFound(String),
    /// Internal error
    InternalError(String),
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::UnsupportedToken(_) => "unsupported_token",
            AuthError::UserNotFound(_) => "user_not_found",
            AuthError::RoleNotFound(_) => "role_not_found",
            AuthError::InternalError(_) => "internal_error",
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid username or password"),
            AuthError::UnsupportedToken(kind) => {
                write!(f, "Unsupported authentication token: {kind}")
            }
            AuthError::UserNotFound(user_id) => write!(f, "User not found: {user_id}"),
            AuthError::RoleNotFound(role_id) => write!(f, "Role not found: {role_id}"),
            AuthError::InternalError(msg) => write!(f, "Internal authentication error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}
