// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Password verification against a remote identity directory, with an
//! in-memory credential cache in front of it.
//!
//! ## Flow
//!
//! 1. The host hands a [`realm::AuthenticationToken`] to [`DirectoryRealm`]
//! 2. [`CachingAuthenticator`] checks the credential cache, then the directory
//! 3. Roles come from directory groups via [`RoleMapping`]
//!
//! [`DirectoryUserManager`] lists and searches directory users and roles for
//! the host's administration views.
//!
//! ## Security
//!
//! - Plaintext passwords live in [`Password`] and are zeroed on drop
//! - Only salted PBKDF2 digests are cached, never in a log and never on disk
//! - Failed logins are not cached
//! - Directory errors and timeouts fail closed

pub mod authenticator;
pub mod error;
pub mod hasher;
pub mod password;
pub mod realm;
pub mod roles;
pub mod users;

pub use authenticator::{Authenticator, AuthenticatorStats, CachingAuthenticator, GroupResolver};
pub use error::AuthError;
pub use hasher::PasswordHasher;
pub use password::Password;
pub use realm::{AuthenticationInfo, AuthenticationToken, AuthorizationInfo, DirectoryRealm};
pub use roles::{RoleMapping, RoleMappingEntry};
pub use users::{DirectoryRole, DirectoryUserManager, ManagedUser};
