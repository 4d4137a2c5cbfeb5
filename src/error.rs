// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Error types shared across the realm.
//!
//! None of these ever reach an authentication caller directly: directory and
//! hashing failures are logged and collapsed into a plain "not authenticated"
//! answer by the orchestrator.

use std::time::Duration;

/// Errors reported by a [`DirectoryClient`](crate::directory::DirectoryClient).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    #[error("Directory unavailable: {0}")]
    Unavailable(String),

    #[error("Directory call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Directory protocol error: {0}")]
    Protocol(String),

    #[error("Directory operation not supported: {0}")]
    Unsupported(&'static str),
}

/// Errors from the password hashing primitive.
///
/// These indicate a broken deployment environment, not bad input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HashingError {
    #[error("Secure random source unavailable")]
    EntropyUnavailable,
}

/// Errors raised while loading or validating [`RealmConfig`](crate::config::RealmConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised while building a
/// [`CachingAuthenticator`](crate::auth::CachingAuthenticator) from configuration.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Hashing(#[from] HashingError),
}
