// src/config/validate.rs

use std::collections::HashSet;
use std::time::Duration;

use crate::config::model::{ConfigFile, ConfigSection, PollSettings, RawConfigFile, SourceConfig};
use crate::errors::{ChangewatchError, Result};
use crate::source::SourceDescriptor;
use crate::types::{is_http_url, parse_duration, SourceKind};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::ChangewatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_sources(&raw)?;
        ensure_unique_locations(&raw)?;
        let settings = validate_settings(&raw.config)?;
        let sources = raw
            .source
            .iter()
            .map(validate_source)
            .collect::<Result<Vec<_>>>()?;
        Ok(ConfigFile::new_unchecked(settings, raw.notify, sources))
    }
}

fn config_error(msg: impl Into<String>) -> ChangewatchError {
    ChangewatchError::ConfigError(msg.into())
}

fn ensure_has_sources(cfg: &RawConfigFile) -> Result<()> {
    if cfg.source.is_empty() {
        return Err(config_error(
            "config must contain at least one source to monitor",
        ));
    }
    Ok(())
}

fn ensure_unique_locations(cfg: &RawConfigFile) -> Result<()> {
    let mut seen = HashSet::new();
    for source in cfg.source.iter() {
        let location = source.location.trim();
        if !seen.insert(location) {
            return Err(config_error(format!(
                "source '{location}' is listed more than once"
            )));
        }
    }
    Ok(())
}

/// Upper bound for every configured duration (30 days).
const MAX_DURATION: Duration = Duration::from_secs(30 * 24 * 60 * 60);

fn duration_field(field: &str, value: &str, allow_zero: bool) -> Result<Duration> {
    let duration = parse_duration(value)
        .map_err(|e| config_error(format!("{field}: {e}")))?;
    if !allow_zero && duration.is_zero() {
        return Err(config_error(format!("{field} must be greater than zero")));
    }
    if duration > MAX_DURATION {
        return Err(config_error(format!(
            "{field} must be at most {}h (got '{value}')",
            MAX_DURATION.as_secs() / 3600
        )));
    }
    Ok(duration)
}

fn validate_settings(section: &ConfigSection) -> Result<PollSettings> {
    if section.queue_length == 0 {
        return Err(config_error(
            "[config].queue_length must be >= 1 (got 0)",
        ));
    }

    Ok(PollSettings {
        interval: duration_field("[config].interval", &section.interval, false)?,
        fetch_timeout: duration_field("[config].fetch_timeout", &section.fetch_timeout, false)?,
        stagger: duration_field("[config].stagger", &section.stagger, true)?,
        shutdown_grace: duration_field("[config].shutdown_grace", &section.shutdown_grace, true)?,
        queue_length: section.queue_length,
    })
}

fn validate_source(source: &SourceConfig) -> Result<SourceDescriptor> {
    let location = source.location.trim();
    if location.is_empty() {
        return Err(config_error("source location must not be empty"));
    }

    let kind = source
        .kind
        .unwrap_or_else(|| SourceKind::infer(location, false));

    match (kind, is_http_url(location)) {
        (SourceKind::File, true) => {
            return Err(config_error(format!(
                "source '{location}' is a URL but has kind \"file\""
            )));
        }
        (SourceKind::Document | SourceKind::Scripts, false) => {
            return Err(config_error(format!(
                "source '{location}' has kind \"{kind}\" but is not an http(s) URL"
            )));
        }
        _ => {}
    }

    let mut descriptor = SourceDescriptor::new(location, kind)
        .with_script_resolution(source.resolve && kind == SourceKind::Scripts);

    if let Some(ref interval) = source.interval {
        let field = format!("interval of source '{location}'");
        descriptor = descriptor.with_interval(duration_field(&field, interval, false)?);
    }

    Ok(descriptor)
}
