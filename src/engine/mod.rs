// src/engine/mod.rs

//! Polling engine.
//!
//! - [`poller`] runs the detection loop for one source: wait for the next
//!   tick, fetch, feed the result into the source's
//!   [`SourceState`](crate::detect::SourceState), hand any report to the
//!   sink.
//! - [`scheduler`] starts one poller task per source and stops them all on
//!   cancellation, within a bounded grace period.
//!
//! Pollers share nothing but the fetcher (read-only) and the report sink.

use std::time::Duration;

use crate::config::PollSettings;
use crate::detect::Observation;
use crate::source::SourceId;

pub mod poller;
pub mod scheduler;

pub use poller::{fetch_with_timeout, poll_source, PollContext};
pub use scheduler::{Scheduler, SchedulerHandle};

/// Timing knobs shared by every polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerOptions {
    /// Default polling interval (sources may override it).
    pub interval: Duration,
    /// Upper bound on a single fetch.
    pub fetch_timeout: Duration,
    /// Start offset between consecutive sources.
    pub stagger: Duration,
    /// How long shutdown waits for loops before aborting them.
    pub shutdown_grace: Duration,
}

impl From<&PollSettings> for SchedulerOptions {
    fn from(settings: &PollSettings) -> Self {
        Self {
            interval: settings.interval,
            fetch_timeout: settings.fetch_timeout,
            stagger: settings.stagger,
            shutdown_grace: settings.shutdown_grace,
        }
    }
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            fetch_timeout: Duration::from_secs(10),
            stagger: Duration::ZERO,
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

/// What one polling loop did over its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSummary {
    pub source: SourceId,
    /// Completed detection cycles (fetch + observe).
    pub cycles: u64,
    /// Reports handed to the sink and accepted.
    pub reports: u64,
    /// Failed fetches, including timeouts.
    pub failures: u64,
    /// Reports the sink rejected.
    pub dropped_reports: u64,
    /// Whether a baseline was ever captured.
    pub has_baseline: bool,
}

impl SourceSummary {
    pub fn new(source: SourceId) -> Self {
        Self {
            source,
            cycles: 0,
            reports: 0,
            failures: 0,
            dropped_reports: 0,
            has_baseline: false,
        }
    }

    pub(crate) fn record(&mut self, observation: &Observation) {
        self.cycles += 1;
        match observation {
            Observation::BaselineCaptured => self.has_baseline = true,
            Observation::Failed { .. } => self.failures += 1,
            Observation::Unchanged | Observation::Changed(_) => {}
        }
    }
}
