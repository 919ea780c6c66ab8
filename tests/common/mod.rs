#![allow(dead_code)]

pub use changewatch_test_utils::builders;
pub use changewatch_test_utils::scripted_fetcher::{lines_content, Step};
pub use changewatch_test_utils::{init_tracing, with_timeout, RecordingNotifier, ScriptedFetcher};

use std::sync::Arc;
use std::time::Duration;

use changewatch::engine::{Scheduler, SchedulerHandle, SchedulerOptions, SourceSummary};
use changewatch::notify::ReportSink;
use changewatch::source::SourceDescriptor;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Options with round numbers that are easy to reason about under paused time.
pub fn options(interval_secs: u64, fetch_timeout_secs: u64) -> SchedulerOptions {
    SchedulerOptions {
        interval: Duration::from_secs(interval_secs),
        fetch_timeout: Duration::from_secs(fetch_timeout_secs),
        stagger: Duration::ZERO,
        shutdown_grace: Duration::from_secs(5),
    }
}

/// A running scheduler wired to a scripted fetcher and a recording notifier.
pub struct Harness {
    pub fetcher: Arc<ScriptedFetcher>,
    pub notifier: RecordingNotifier,
    pub sink: ReportSink,
    pub writer: JoinHandle<()>,
    pub handle: SchedulerHandle,
}

impl Harness {
    pub fn start(
        sources: Vec<SourceDescriptor>,
        fetcher: ScriptedFetcher,
        notifier: RecordingNotifier,
        queue_length: usize,
        options: SchedulerOptions,
    ) -> Self {
        let fetcher = Arc::new(fetcher);
        let (sink, writer) = ReportSink::spawn(Box::new(notifier.clone()), queue_length);
        let handle = Scheduler::new(sources, fetcher.clone(), sink.clone(), options)
            .spawn(CancellationToken::new());

        Self {
            fetcher,
            notifier,
            sink,
            writer,
            handle,
        }
    }

    /// Stop every loop and return the summaries sorted by source.
    pub async fn stop(self) -> (Vec<SourceSummary>, RecordingNotifier) {
        let mut summaries = self.handle.shutdown().await;
        summaries.sort_by(|a, b| a.source.as_str().cmp(b.source.as_str()));
        drop(self.sink);
        self.writer.await.expect("report writer panicked");
        (summaries, self.notifier)
    }
}
