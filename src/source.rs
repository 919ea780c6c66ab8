// src/source.rs

//! Source descriptors: what to monitor and how.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::types::SourceKind;

/// Stable identifier of a monitored source (its configured location).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(Arc<str>);

impl SourceId {
    pub fn new(location: &str) -> Self {
        Self(Arc::from(location))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name used when persisting reports for this source.
    ///
    /// A location that is already a safe file name maps to `log_<location>.txt`.
    /// Anything that had to be rewritten (scheme dropped, separators
    /// replaced) also gets the first 8 hex digits of the location's BLAKE3
    /// hash, e.g. `https://example.com/app/` ->
    /// `log_example.com_app_-<hash>.txt`, so two sources never share a file.
    pub fn log_file_name(&self) -> String {
        let location = self.as_str();
        let stripped = location
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(location);

        let sanitized: String = stripped
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let sanitized = sanitized.trim_start_matches(['.', '_']);
        let stem = if sanitized.is_empty() { "source" } else { sanitized };

        if stem == location {
            format!("log_{stem}.txt")
        } else {
            let hash = blake3::hash(location.as_bytes()).to_hex();
            format!("log_{stem}-{}.txt", &hash.as_str()[..8])
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Immutable description of one monitored source.
///
/// Built once from configuration and shared read-only with the polling loop
/// that owns the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    id: SourceId,
    kind: SourceKind,
    interval: Option<Duration>,
    resolve_scripts: bool,
}

impl SourceDescriptor {
    pub fn new(location: &str, kind: SourceKind) -> Self {
        Self {
            id: SourceId::new(location),
            kind,
            interval: None,
            resolve_scripts: false,
        }
    }

    pub fn local_file(path: &str) -> Self {
        Self::new(path, SourceKind::File)
    }

    pub fn document(url: &str) -> Self {
        Self::new(url, SourceKind::Document)
    }

    pub fn scripts(url: &str) -> Self {
        Self::new(url, SourceKind::Scripts)
    }

    /// Poll this source at its own cadence instead of the global default.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Resolve relative script references against the page URL.
    pub fn with_script_resolution(mut self, resolve: bool) -> Self {
        self.resolve_scripts = resolve;
        self
    }

    pub fn id(&self) -> &SourceId {
        &self.id
    }

    /// Path or URL, exactly as configured.
    pub fn location(&self) -> &str {
        self.id.as_str()
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn interval_override(&self) -> Option<Duration> {
        self.interval
    }

    pub fn effective_interval(&self, default: Duration) -> Duration {
        self.interval.unwrap_or(default)
    }

    pub fn resolve_scripts(&self) -> bool {
        self.resolve_scripts
    }

    /// File name used when persisting reports for this source.
    pub fn log_file_name(&self) -> String {
        self.id.log_file_name()
    }
}
