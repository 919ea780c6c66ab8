// src/logging.rs

//! Diagnostics go to stderr through `tracing`; stdout is left to the console
//! notifier.
//!
//! The filter comes from the first of:
//! 1. `--log-level` (applies to every target)
//! 2. `CHANGEWATCH_LOG`, parsed as `EnvFilter` directives, so
//!    `CHANGEWATCH_LOG=info,changewatch::engine=debug` works
//! 3. `info`
//!
//! An unparsable `CHANGEWATCH_LOG` falls back to `info` and is reported once
//! the subscriber is up.

use anyhow::{anyhow, Result};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "CHANGEWATCH_LOG";
const DEFAULT_DIRECTIVES: &str = "info";

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Filter plus the rejected `CHANGEWATCH_LOG` value, if any.
fn build_filter(cli_level: Option<LogLevel>, env_value: Option<&str>) -> (EnvFilter, Option<String>) {
    if let Some(level) = cli_level {
        return (EnvFilter::new(level.as_directive()), None);
    }

    match env_value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(directives) => match EnvFilter::try_new(directives) {
            Ok(filter) => (filter, None),
            Err(_) => (EnvFilter::new(DEFAULT_DIRECTIVES), Some(directives.to_string())),
        },
        None => (EnvFilter::new(DEFAULT_DIRECTIVES), None),
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_value = std::env::var(LOG_ENV_VAR).ok();
    let (filter, rejected) = build_filter(cli_level, env_value.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))?;

    if let Some(value) = rejected {
        warn!(var = LOG_ENV_VAR, value = %value, "ignoring invalid log filter; using info");
    }
    Ok(())
}
