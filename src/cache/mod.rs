// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Cache Module
//!
//! Memory-only caches that sit in front of the identity directory.
//!
//! ## Contents
//!
//! - `ttl` - generic bounded TTL cache (one mutex, insertion-ordered eviction)
//! - `credentials` - username -> salted password hash
//! - `groups` - username / all-groups -> group names
//! - `janitor` - optional background sweep of expired entries
//!
//! Nothing here is ever written to disk. Entries die with the process, on TTL
//! expiry, or on explicit invalidation.

pub mod credentials;
pub mod groups;
pub mod janitor;
pub mod ttl;

pub use credentials::{CachedCredential, CredentialCache};
pub use groups::{GroupCache, ALL_GROUPS_KEY, GROUPS_KEY_PREFIX};
pub use janitor::CacheJanitor;
pub use ttl::{CacheStats, Cached, TtlCache};
