#![allow(dead_code)]

use changewatch::config::{ConfigFile, RawConfigFile, SourceConfig};
use changewatch::types::SourceKind;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_source(mut self, source: SourceConfig) -> Self {
        self.config.source.push(source);
        self
    }

    pub fn with_file(self, path: &str) -> Self {
        self.with_source(SourceConfigBuilder::new(path).kind(SourceKind::File).build())
    }

    pub fn with_interval(mut self, interval: &str) -> Self {
        self.config.config.interval = interval.to_string();
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: &str) -> Self {
        self.config.config.fetch_timeout = timeout.to_string();
        self
    }

    pub fn with_stagger(mut self, stagger: &str) -> Self {
        self.config.config.stagger = stagger.to_string();
        self
    }

    pub fn with_queue_length(mut self, len: usize) -> Self {
        self.config.config.queue_length = len;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `SourceConfig`.
pub struct SourceConfigBuilder {
    source: SourceConfig,
}

impl SourceConfigBuilder {
    pub fn new(location: &str) -> Self {
        Self {
            source: SourceConfig::new(location),
        }
    }

    pub fn kind(mut self, kind: SourceKind) -> Self {
        self.source.kind = Some(kind);
        self
    }

    pub fn interval(mut self, interval: &str) -> Self {
        self.source.interval = Some(interval.to_string());
        self
    }

    pub fn resolve(mut self, resolve: bool) -> Self {
        self.source.resolve = resolve;
        self
    }

    pub fn build(self) -> SourceConfig {
        self.source
    }
}
