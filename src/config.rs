// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Realm Configuration
//!
//! Configuration is read from an optional JSON file (conventionally
//! `$DATA_DIR/etc/crowd-properties.json`), then overridden by environment
//! variables, then validated. Field names in the file are camelCase; the
//! legacy names used by older plugin releases are accepted as aliases.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SERVER_URL` | Directory base URL (trailing `/` stripped) | empty |
//! | `APPLICATION_USERNAME` | Application name registered with the directory | `nexus` |
//! | `APPLICATION_PASSWORD` | Path to a file holding the application password | unset |
//! | `CROWD_CACHE_ENABLED` | Cache successful logins (`true`/`false`) | `false` |
//! | `CROWD_CREDENTIAL_TTL_SECONDS` | Credential cache TTL | `900` |
//! | `CROWD_GROUP_TTL_SECONDS` | Group cache TTL | `900` |
//! | `CROWD_MAX_CACHE_ENTRIES` | Max entries in the credential cache | `100` |
//! | `CROWD_MAX_GROUP_CACHE_ENTRIES` | Max entries in the group cache | `CROWD_MAX_CACHE_ENTRIES` |
//! | `CROWD_SWEEP_INTERVAL_SECONDS` | Expired-entry sweep interval, `0` disables | `60` |
//! | `CONNECTION_TIMEOUT` | Directory connect timeout (ms) | `15000` |
//! | `SOCKET_TIMEOUT` | Directory socket/read timeout (ms) | `15000` |
//! | `CONNECTION_REQUEST_TIMEOUT` | Directory connection-pool wait (ms) | `15000` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::auth::roles::{RoleMapping, RoleMappingEntry};
use crate::error::ConfigError;

/// Directory base URL.
pub const SERVER_URL_ENV: &str = "SERVER_URL";

/// Application name used by the directory client.
pub const APPLICATION_USERNAME_ENV: &str = "APPLICATION_USERNAME";

/// Path to a file (e.g. a container secret) holding the application password.
pub const APPLICATION_PASSWORD_ENV: &str = "APPLICATION_PASSWORD";

pub const CACHE_ENABLED_ENV: &str = "CROWD_CACHE_ENABLED";
pub const CREDENTIAL_TTL_ENV: &str = "CROWD_CREDENTIAL_TTL_SECONDS";
pub const GROUP_TTL_ENV: &str = "CROWD_GROUP_TTL_SECONDS";
pub const MAX_CACHE_ENTRIES_ENV: &str = "CROWD_MAX_CACHE_ENTRIES";
pub const MAX_GROUP_CACHE_ENTRIES_ENV: &str = "CROWD_MAX_GROUP_CACHE_ENTRIES";
pub const SWEEP_INTERVAL_ENV: &str = "CROWD_SWEEP_INTERVAL_SECONDS";
pub const CONNECT_TIMEOUT_ENV: &str = "CONNECTION_TIMEOUT";
pub const SOCKET_TIMEOUT_ENV: &str = "SOCKET_TIMEOUT";
pub const CONNECTION_REQUEST_TIMEOUT_ENV: &str = "CONNECTION_REQUEST_TIMEOUT";

/// Default cache lifetime (15 minutes).
pub const DEFAULT_TTL_SECONDS: u64 = 900;

pub const DEFAULT_MAX_CACHE_ENTRIES: usize = 100;

/// Default for each directory timeout (milliseconds).
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

pub const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 60;

const DEFAULT_APPLICATION_NAME: &str = "nexus";

/// Timeouts a directory transport must honour.
///
/// The realm enforces [`DirectoryTimeouts::total`] as the deadline for one
/// directory call, so a transport that ignores its own settings still cannot
/// hang a login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryTimeouts {
    pub connect: Duration,
    pub socket: Duration,
    pub connection_request: Duration,
}

impl DirectoryTimeouts {
    /// Upper bound for a single call: pool wait + connect + read.
    pub fn total(&self) -> Duration {
        self.connect + self.socket + self.connection_request
    }
}

impl Default for DirectoryTimeouts {
    fn default() -> Self {
        let timeout = Duration::from_millis(DEFAULT_TIMEOUT_MS);
        Self {
            connect: timeout,
            socket: timeout,
            connection_request: timeout,
        }
    }
}

/// Full realm configuration.
#[derive(Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RealmConfig {
    #[serde(alias = "serverURL", alias = "crowdServerUrl")]
    pub server_url: String,

    #[serde(alias = "appUser")]
    pub application_name: String,

    pub application_password: Option<String>,

    #[serde(alias = "authCache")]
    pub cache_enabled: bool,

    #[serde(alias = "credentialTTLSeconds", alias = "cacheTTL")]
    pub credential_ttl_seconds: u64,

    #[serde(alias = "groupTTLSeconds")]
    pub group_ttl_seconds: u64,

    pub max_cache_entries: usize,

    /// Group cache capacity; falls back to `max_cache_entries`.
    pub max_group_cache_entries: Option<usize>,

    #[serde(alias = "connectTimeout")]
    pub connect_timeout_ms: u64,

    #[serde(alias = "socketTimeout")]
    pub socket_timeout_ms: u64,

    #[serde(alias = "requestTimeout")]
    pub connection_request_timeout_ms: u64,

    pub sweep_interval_seconds: u64,

    pub filter_group: Option<String>,

    pub role_mapping: Vec<RoleMappingEntry>,

    pub strict_role_mapping: bool,
}

impl Default for RealmConfig {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            application_name: DEFAULT_APPLICATION_NAME.to_string(),
            application_password: None,
            cache_enabled: false,
            credential_ttl_seconds: DEFAULT_TTL_SECONDS,
            group_ttl_seconds: DEFAULT_TTL_SECONDS,
            max_cache_entries: DEFAULT_MAX_CACHE_ENTRIES,
            max_group_cache_entries: None,
            connect_timeout_ms: DEFAULT_TIMEOUT_MS,
            socket_timeout_ms: DEFAULT_TIMEOUT_MS,
            connection_request_timeout_ms: DEFAULT_TIMEOUT_MS,
            sweep_interval_seconds: DEFAULT_SWEEP_INTERVAL_SECONDS,
            filter_group: None,
            role_mapping: Vec::new(),
            strict_role_mapping: false,
        }
    }
}

impl std::fmt::Debug for RealmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealmConfig")
            .field("server_url", &self.server_url)
            .field("application_name", &self.application_name)
            .field(
                "application_password",
                &self.application_password.as_ref().map(|_| "***"),
            )
            .field("cache_enabled", &self.cache_enabled)
            .field("credential_ttl_seconds", &self.credential_ttl_seconds)
            .field("group_ttl_seconds", &self.group_ttl_seconds)
            .field("max_cache_entries", &self.max_cache_entries)
            .field("max_group_cache_entries", &self.max_group_cache_entries)
            .field("timeouts", &self.timeouts())
            .field("sweep_interval_seconds", &self.sweep_interval_seconds)
            .field("filter_group", &self.filter_group)
            .field("role_mapping", &self.role_mapping)
            .field("strict_role_mapping", &self.strict_role_mapping)
            .finish()
    }
}

impl RealmConfig {
    /// Load from a JSON file, apply environment overrides, and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config: RealmConfig = serde_json::from_str(&contents)?;
        tracing::debug!(path = %path.display(), "Loaded realm configuration file");
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults + environment overrides, validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = get(SERVER_URL_ENV) {
            self.server_url = url;
        }
        if let Some(name) = get(APPLICATION_USERNAME_ENV) {
            self.application_name = name;
        }
        if let Some(path) = get(APPLICATION_PASSWORD_ENV) {
            self.application_password = Some(read_secret_file(&path)?);
        }
        if let Some(value) = get(CACHE_ENABLED_ENV) {
            self.cache_enabled = parse_bool(CACHE_ENABLED_ENV, &value)?;
        }
        if let Some(value) = get(CREDENTIAL_TTL_ENV) {
            self.credential_ttl_seconds = parse_number(CREDENTIAL_TTL_ENV, &value)?;
        }
        if let Some(value) = get(GROUP_TTL_ENV) {
            self.group_ttl_seconds = parse_number(GROUP_TTL_ENV, &value)?;
        }
        if let Some(value) = get(MAX_CACHE_ENTRIES_ENV) {
            self.max_cache_entries = parse_number(MAX_CACHE_ENTRIES_ENV, &value)?;
        }
        if let Some(value) = get(MAX_GROUP_CACHE_ENTRIES_ENV) {
            self.max_group_cache_entries = Some(parse_number(MAX_GROUP_CACHE_ENTRIES_ENV, &value)?);
        }
        if let Some(value) = get(SWEEP_INTERVAL_ENV) {
            self.sweep_interval_seconds = parse_number(SWEEP_INTERVAL_ENV, &value)?;
        }
        if let Some(value) = get(CONNECT_TIMEOUT_ENV) {
            self.connect_timeout_ms = parse_number(CONNECT_TIMEOUT_ENV, &value)?;
        }
        if let Some(value) = get(SOCKET_TIMEOUT_ENV) {
            self.socket_timeout_ms = parse_number(SOCKET_TIMEOUT_ENV, &value)?;
        }
        if let Some(value) = get(CONNECTION_REQUEST_TIMEOUT_ENV) {
            self.connection_request_timeout_ms =
                parse_number(CONNECTION_REQUEST_TIMEOUT_ENV, &value)?;
        }
        Ok(())
    }

    /// Reject values the caches and deadlines cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("credentialTtlSeconds", self.credential_ttl_seconds),
            ("groupTtlSeconds", self.group_ttl_seconds),
            ("maxCacheEntries", self.max_cache_entries as u64),
            ("maxGroupCacheEntries", self.group_cache_capacity() as u64),
            ("connectTimeoutMs", self.connect_timeout_ms),
            ("socketTimeoutMs", self.socket_timeout_ms),
            ("connectionRequestTimeoutMs", self.connection_request_timeout_ms),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{key} must be greater than zero")));
            }
        }
        Ok(())
    }

    pub fn credential_ttl(&self) -> Duration {
        Duration::from_secs(self.credential_ttl_seconds)
    }

    pub fn group_ttl(&self) -> Duration {
        Duration::from_secs(self.group_ttl_seconds)
    }

    pub fn group_cache_capacity(&self) -> usize {
        self.max_group_cache_entries.unwrap_or(self.max_cache_entries)
    }

    pub fn timeouts(&self) -> DirectoryTimeouts {
        DirectoryTimeouts {
            connect: Duration::from_millis(self.connect_timeout_ms),
            socket: Duration::from_millis(self.socket_timeout_ms),
            connection_request: Duration::from_millis(self.connection_request_timeout_ms),
        }
    }

    /// `None` when background sweeping is disabled.
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_seconds > 0).then(|| Duration::from_secs(self.sweep_interval_seconds))
    }

    /// Server URL without a trailing slash.
    pub fn normalized_server_url(&self) -> &str {
        normalize_server_url(&self.server_url)
    }

    pub fn role_mapping(&self) -> RoleMapping {
        RoleMapping::new(self.role_mapping.clone())
            .with_filter_group(self.filter_group.clone())
            .strict(self.strict_role_mapping)
    }
}

/// Strip a single trailing `/` from a directory URL.
pub fn normalize_server_url(url: &str) -> &str {
    url.strip_suffix('/').unwrap_or(url)
}

fn read_secret_file(path: &str) -> Result<String, ConfigError> {
    let secret = std::fs::read_to_string(path)?;
    Ok(secret.trim().to_string())
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}
