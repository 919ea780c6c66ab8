// src/engine/scheduler.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::engine::poller::{poll_source, PollContext};
use crate::engine::{SchedulerOptions, SourceSummary};
use crate::fetch::Fetcher;
use crate::notify::ReportSink;
use crate::source::SourceDescriptor;

/// Starts one independent polling task per source.
pub struct Scheduler {
    sources: Vec<SourceDescriptor>,
    fetcher: Arc<dyn Fetcher>,
    sink: ReportSink,
    options: SchedulerOptions,
}

impl Scheduler {
    pub fn new(
        sources: Vec<SourceDescriptor>,
        fetcher: Arc<dyn Fetcher>,
        sink: ReportSink,
        options: SchedulerOptions,
    ) -> Self {
        Self {
            sources,
            fetcher,
            sink,
            options,
        }
    }

    /// Start offset of the source at `index`.
    fn start_delay(&self, index: usize) -> Duration {
        let index = u32::try_from(index).unwrap_or(u32::MAX);
        self.options.stagger.saturating_mul(index)
    }

    /// Spawn every polling loop. They run until `cancel` fires.
    pub fn spawn(self, cancel: CancellationToken) -> SchedulerHandle {
        let mut tasks = JoinSet::new();

        for (index, source) in self.sources.iter().enumerate() {
            let ctx = PollContext {
                interval: source.effective_interval(self.options.interval),
                source: source.clone(),
                fetcher: Arc::clone(&self.fetcher),
                sink: self.sink.clone(),
                fetch_timeout: self.options.fetch_timeout,
                start_delay: self.start_delay(index),
                cancel: cancel.child_token(),
            };
            debug!(source = %source.id(), delay = ?ctx.start_delay, "spawning polling loop");
            tasks.spawn(poll_source(ctx));
        }

        info!(sources = tasks.len(), "scheduler started");

        SchedulerHandle {
            cancel,
            tasks,
            grace: self.options.shutdown_grace,
        }
    }
}

/// Handle to the running polling loops.
pub struct SchedulerHandle {
    cancel: CancellationToken,
    tasks: JoinSet<SourceSummary>,
    grace: Duration,
}

impl std::fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("running", &self.tasks.len())
            .field("grace", &self.grace)
            .finish_non_exhaustive()
    }
}

impl SchedulerHandle {
    /// Number of loops not yet collected.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait until the cancellation token fires, then stop every loop.
    pub async fn run_until_cancelled(self) -> Vec<SourceSummary> {
        self.cancel.cancelled().await;
        self.drain().await
    }

    /// Request a stop and wait for every loop to finish.
    pub async fn shutdown(self) -> Vec<SourceSummary> {
        self.cancel.cancel();
        self.drain().await
    }

    /// Collect loops that exit within the grace period; abort the rest.
    async fn drain(mut self) -> Vec<SourceSummary> {
        info!(running = self.tasks.len(), "stopping polling loops");

        let deadline = Instant::now().checked_add(self.grace);
        let mut summaries = Vec::with_capacity(self.tasks.len());

        loop {
            let next = match deadline {
                Some(deadline) => time::timeout_at(deadline, self.tasks.join_next()).await,
                None => Ok(self.tasks.join_next().await),
            };
            match next {
                Ok(Some(Ok(summary))) => summaries.push(summary),
                Ok(Some(Err(e))) => warn!(error = %e, "polling loop ended abnormally"),
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        remaining = self.tasks.len(),
                        grace = ?self.grace,
                        "grace period expired; aborting remaining polling loops"
                    );
                    self.tasks.abort_all();
                    while self.tasks.join_next().await.is_some() {}
                    break;
                }
            }
        }

        info!(stopped = summaries.len(), "scheduler stopped");
        summaries
    }
}
