// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{ConfigFile, RawConfigFile, SourceConfig};
use crate::errors::Result;
use crate::types::SourceKind;

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Polling interval in seconds.
    pub interval_secs: Option<u64>,
    /// Infer `scripts` instead of `document` for URLs without an explicit kind.
    pub extract_scripts: bool,
    pub log_dir: Option<String>,
    pub telegram: bool,
}

impl ConfigOverrides {
    fn apply(&self, raw: &mut RawConfigFile) {
        if let Some(secs) = self.interval_secs {
            raw.config.interval = format!("{secs}s");
        }
        if let Some(ref dir) = self.log_dir {
            raw.notify.log_dir = Some(dir.clone());
        }
        if self.telegram {
            raw.notify.telegram = true;
        }
        for source in raw.source.iter_mut() {
            if source.kind.is_none() {
                source.kind = Some(SourceKind::infer(&source.location, self.extract_scripts));
            }
        }
    }
}

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// `.toml` files are deserialized as a full config; any other file is read as
/// a plain source list (see [`parse_source_list`]). No semantic validation is
/// performed here; use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let is_toml = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);

    if is_toml {
        let config: RawConfigFile = toml::from_str(&contents)?;
        Ok(config)
    } else {
        Ok(RawConfigFile {
            source: parse_source_list(&contents),
            ..RawConfigFile::default()
        })
    }
}

/// Parse a plain source list: one path or URL per line.
///
/// Surrounding whitespace is trimmed; blank lines and `#` comments are skipped.
pub fn parse_source_list(contents: &str) -> Vec<SourceConfig> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(SourceConfig::new)
        .collect()
}

/// Load a configuration file, apply CLI overrides and validate it.
///
/// This is the entry point for the rest of the application. Any error here is
/// fatal: it happens before a single polling loop starts.
pub fn load_and_validate(
    path: impl AsRef<Path>,
    overrides: &ConfigOverrides,
) -> Result<ConfigFile> {
    let mut raw_config = load_from_path(&path)?;
    overrides.apply(&mut raw_config);
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}
