// src/detect/mod.rs

//! Change detection.
//!
//! - [`fingerprint`]: cheap equality gate over fetched content.
//! - [`snapshot`]: the last observed content of a source.
//! - [`diff`]: positional line deltas and script-set deltas.
//! - [`state`]: the per-source state machine that ties them together.
//!
//! Nothing in here performs I/O or knows about scheduling.

pub mod diff;
pub mod fingerprint;
pub mod snapshot;
pub mod state;

pub use diff::{diff_lines, diff_sets, diff_snapshots};
pub use fingerprint::{fingerprint, fingerprint_bytes, Fingerprint};
pub use snapshot::Snapshot;
pub use state::{Observation, Phase, SourceState};
