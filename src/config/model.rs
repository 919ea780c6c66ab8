// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::source::SourceDescriptor;
use crate::types::SourceKind;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// interval = "60s"
/// fetch_timeout = "10s"
///
/// [notify]
/// log_dir = "logs"
///
/// [[source]]
/// location = "https://example.com/"
/// kind = "scripts"
/// ```
///
/// Plain source lists are converted into this shape by the loader, so both
/// formats go through the same validation.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    /// Global polling behaviour from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// Report delivery from `[notify]`.
    #[serde(default)]
    pub notify: NotifySection,

    /// All sources from `[[source]]`, in configuration order.
    #[serde(default)]
    pub source: Vec<SourceConfig>,
}

/// `[config]` section. Durations use the `<n>ms|s|m|h` notation.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Default polling interval for every source.
    #[serde(default = "default_interval")]
    pub interval: String,

    /// Upper bound on a single fetch.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout: String,

    /// Start offset between consecutive sources, to avoid fetching
    /// everything at the same instant.
    #[serde(default = "default_stagger")]
    pub stagger: String,

    /// How long shutdown waits for loops to finish before aborting them.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace: String,

    /// Capacity of the report queue in front of the notifiers.
    #[serde(default = "default_queue_length")]
    pub queue_length: usize,
}

fn default_interval() -> String {
    "60s".to_string()
}

fn default_fetch_timeout() -> String {
    "10s".to_string()
}

fn default_stagger() -> String {
    "0s".to_string()
}

fn default_shutdown_grace() -> String {
    "5s".to_string()
}

fn default_queue_length() -> usize {
    64
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            fetch_timeout: default_fetch_timeout(),
            stagger: default_stagger(),
            shutdown_grace: default_shutdown_grace(),
            queue_length: default_queue_length(),
        }
    }
}

/// `[notify]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifySection {
    /// Print reports to stdout.
    #[serde(default = "default_console")]
    pub console: bool,

    /// Append reports to `<log_dir>/log_<source>.txt`.
    #[serde(default)]
    pub log_dir: Option<String>,

    /// Upload reports to Telegram.
    #[serde(default)]
    pub telegram: bool,
}

fn default_console() -> bool {
    true
}

impl Default for NotifySection {
    fn default() -> Self {
        Self {
            console: default_console(),
            log_dir: None,
            telegram: false,
        }
    }
}

/// `[[source]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Local path or http(s) URL.
    pub location: String,

    /// If `None`, inferred from the location.
    #[serde(default)]
    pub kind: Option<SourceKind>,

    /// Optional per-source polling interval.
    #[serde(default)]
    pub interval: Option<String>,

    /// Resolve relative script references against the page URL
    /// (only meaningful for `kind = "scripts"`).
    #[serde(default)]
    pub resolve: bool,
}

impl SourceConfig {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            kind: None,
            interval: None,
            resolve: false,
        }
    }
}

/// Parsed `[config]` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub fetch_timeout: Duration,
    pub stagger: Duration,
    pub shutdown_grace: Duration,
    pub queue_length: usize,
}

/// Validated configuration.
///
/// Only constructible through `TryFrom<RawConfigFile>` (see `validate.rs`),
/// so holders can rely on every source being well formed.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub settings: PollSettings,
    pub notify: NotifySection,
    pub sources: Vec<SourceDescriptor>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        settings: PollSettings,
        notify: NotifySection,
        sources: Vec<SourceDescriptor>,
    ) -> Self {
        Self {
            settings,
            notify,
            sources,
        }
    }
}
