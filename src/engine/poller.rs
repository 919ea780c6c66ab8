// src/engine/poller.rs

//! The polling loop for a single source.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::detect::{Observation, SourceState};
use crate::engine::SourceSummary;
use crate::fetch::{Content, FetchError, Fetcher};
use crate::notify::ReportSink;
use crate::source::SourceDescriptor;

/// Everything one polling loop needs. Owned by the loop's task.
pub struct PollContext {
    pub source: SourceDescriptor,
    pub fetcher: Arc<dyn Fetcher>,
    pub sink: ReportSink,
    pub interval: Duration,
    pub fetch_timeout: Duration,
    pub start_delay: Duration,
    pub cancel: CancellationToken,
}

/// Fetch `source`, giving up after `limit`.
pub async fn fetch_with_timeout(
    fetcher: &dyn Fetcher,
    source: &SourceDescriptor,
    limit: Duration,
) -> Result<Content, FetchError> {
    match time::timeout(limit, fetcher.fetch(source)).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout(limit)),
    }
}

/// Run detection cycles for one source until `ctx.cancel` fires.
///
/// Ticks follow a fixed cadence from the loop's start. When a fetch overruns
/// the interval, missed ticks are skipped rather than replayed in a burst.
/// Cancellation is observed while waiting for a tick and while a fetch is in
/// flight; an abandoned fetch is not counted as a cycle.
pub async fn poll_source(ctx: PollContext) -> SourceSummary {
    let id = ctx.source.id().clone();
    let mut summary = SourceSummary::new(id.clone());

    if !ctx.start_delay.is_zero() {
        tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => return summary,
            _ = time::sleep(ctx.start_delay) => {}
        }
    }

    let mut ticker = time::interval(ctx.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut state = SourceState::new(id.clone());

    info!(
        source = %id,
        kind = %ctx.source.kind(),
        interval = ?ctx.interval,
        "polling loop started"
    );

    loop {
        tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let fetched = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => {
                debug!(source = %id, "fetch abandoned on shutdown");
                break;
            }
            fetched = fetch_with_timeout(ctx.fetcher.as_ref(), &ctx.source, ctx.fetch_timeout) => fetched,
        };

        let prior_failures = state.consecutive_failures();
        let observation = state.observe(fetched, Local::now());
        summary.record(&observation);
        dispatch(&state, observation, prior_failures, &ctx.sink, &mut summary);
    }

    info!(
        source = %id,
        cycles = summary.cycles,
        reports = summary.reports,
        failures = summary.failures,
        "polling loop stopped"
    );
    summary
}

/// Log an observation and forward any report. Never blocks.
fn dispatch(
    state: &SourceState,
    observation: Observation,
    prior_failures: u32,
    sink: &ReportSink,
    summary: &mut SourceSummary,
) {
    let id = state.source();

    if prior_failures > 0 && !matches!(observation, Observation::Failed { .. }) {
        info!(source = %id, failures = prior_failures, "source recovered");
    }

    match observation {
        Observation::BaselineCaptured => {
            let size = state.snapshot().map(|s| s.len()).unwrap_or(0);
            info!(source = %id, size, "baseline captured");
        }
        Observation::Unchanged => {
            debug!(source = %id, "no change");
        }
        Observation::Changed(report) => {
            info!(
                source = %id,
                added = report.added(),
                removed = report.removed(),
                "change detected"
            );
            match sink.notify(report) {
                Ok(()) => summary.reports += 1,
                Err(e) => {
                    summary.dropped_reports += 1;
                    warn!(source = %id, error = %e, "change report dropped");
                }
            }
        }
        Observation::Failed {
            consecutive_failures,
            error,
        } => {
            warn!(
                source = %id,
                failures = consecutive_failures,
                error = %error,
                "fetch failed; keeping previous snapshot"
            );
        }
    }
}
