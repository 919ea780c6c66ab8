// src/config/mod.rs

//! Configuration loading and validation for changewatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a TOML config or a plain source list from disk (`loader.rs`).
//! - Validate sources and durations (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, parse_source_list, ConfigOverrides};
pub use model::{
    ConfigFile, ConfigSection, NotifySection, PollSettings, RawConfigFile, SourceConfig,
};
