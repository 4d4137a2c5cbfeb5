// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Crowd Realm - cached directory authentication
//!
//! Authenticates users against a remote identity directory and keeps
//! salted PBKDF2 digests of recent successful logins in memory, so repeat
//! logins within the TTL skip the network round-trip.
//!
//! ## Modules
//!
//! - `auth` - password hashing, caching authenticator, realm and user manager
//! - `cache` - TTL-bounded credential and group caches
//! - `config` - JSON file + environment configuration
//! - `directory` - the remote directory interface
//! - `error` - shared error types
//! - `telemetry` - tracing subscriber setup

pub mod auth;
pub mod cache;
pub mod config;
pub mod directory;
pub mod error;
pub mod telemetry;

#[cfg(test)]
mod testutil;

pub use auth::{
    Authenticator, CachingAuthenticator, DirectoryRealm, DirectoryUserManager, GroupResolver,
    Password, PasswordHasher,
};
pub use config::RealmConfig;
pub use directory::DirectoryClient;
