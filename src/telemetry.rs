// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Logging setup for hosts that do not install their own subscriber.
//!
//! The realm itself only emits `tracing` events. Usernames appear as
//! structured fields; passwords and hashes never do.

use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

/// Output format (`LOG_FORMAT`).
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Level filter (`RUST_LOG` syntax).
pub const LOG_FILTER_ENV: &str = "RUST_LOG";

const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// Anything other than `json` falls back to pretty output.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub filter: Option<String>,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self {
            format: std::env::var(LOG_FORMAT_ENV)
                .map(|v| LogFormat::parse(&v))
                .unwrap_or_default(),
            filter: std::env::var(LOG_FILTER_ENV).ok().filter(|f| !f.trim().is_empty()),
        }
    }

    fn env_filter(&self) -> EnvFilter {
        let directives = self.filter.as_deref().unwrap_or(DEFAULT_FILTER);
        EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install a global subscriber. Fails if one is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TryInitError> {
    let filter = config.env_filter();
    match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init(),
    }
}
