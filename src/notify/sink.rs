// src/notify/sink.rs

//! Single-writer report queue in front of a [`Notifier`].
//!
//! Any number of polling loops hold a cloned [`ReportSink`]. Submitting a
//! report never waits: it is either queued or rejected on the spot, so a slow
//! or broken notifier can cost reports but never stalls a polling loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::notify::{Notifier, NotifyError};
use crate::report::ChangeReport;

#[derive(Debug, Default)]
struct Counters {
    accepted: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

/// Point-in-time copy of the sink counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkCounters {
    /// Reports queued for delivery.
    pub accepted: u64,
    /// Reports the notifier took successfully.
    pub delivered: u64,
    /// Reports the notifier failed to deliver.
    pub failed: u64,
    /// Reports rejected because the queue was full or closed.
    pub dropped: u64,
}

/// Cloneable handle for submitting reports.
#[derive(Debug, Clone)]
pub struct ReportSink {
    tx: mpsc::Sender<ChangeReport>,
    counters: Arc<Counters>,
}

impl ReportSink {
    /// Spawn the writer task and return the submitting handle plus the
    /// writer's join handle.
    ///
    /// The writer exits once every `ReportSink` clone has been dropped and
    /// the queue is drained, so awaiting the join handle flushes all
    /// accepted reports.
    pub fn spawn(notifier: Box<dyn Notifier>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<ChangeReport>(capacity.max(1));
        let counters = Arc::new(Counters::default());

        let writer_counters = Arc::clone(&counters);
        let writer = tokio::spawn(async move {
            info!(notifier = notifier.name(), "report writer started");

            while let Some(report) = rx.recv().await {
                match notifier.accept(&report).await {
                    Ok(()) => {
                        writer_counters.delivered.fetch_add(1, Ordering::Relaxed);
                        debug!(source = %report.source(), "report delivered");
                    }
                    Err(e) => {
                        writer_counters.failed.fetch_add(1, Ordering::Relaxed);
                        warn!(
                            source = %report.source(),
                            notifier = notifier.name(),
                            error = %e,
                            "report delivery failed"
                        );
                    }
                }
            }

            info!("report writer finished (all senders dropped)");
        });

        (Self { tx, counters }, writer)
    }

    /// Queue a report for delivery.
    ///
    /// `Ok` only means the report was accepted into the queue.
    pub fn notify(&self, report: ChangeReport) -> Result<(), NotifyError> {
        match self.tx.try_send(report) {
            Ok(()) => {
                self.counters.accepted.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                Err(NotifyError::QueueFull)
            }
            Err(TrySendError::Closed(_)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                Err(NotifyError::Closed)
            }
        }
    }

    pub fn counters(&self) -> SinkCounters {
        SinkCounters {
            accepted: self.counters.accepted.load(Ordering::Relaxed),
            delivered: self.counters.delivered.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotifyFuture;
    use crate::report::ChangeEntry;
    use crate::source::SourceId;
    use chrono::Local;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    struct Collect(Arc<Mutex<Vec<String>>>);

    impl Notifier for Collect {
        fn name(&self) -> &'static str {
            "collect"
        }

        fn accept<'a>(&'a self, report: &'a ChangeReport) -> NotifyFuture<'a> {
            Box::pin(async move {
                self.0.lock().unwrap().push(report.source().to_string());
                Ok(())
            })
        }
    }

    /// Blocks until released, then fails.
    struct Stuck(Arc<Notify>);

    impl Notifier for Stuck {
        fn name(&self) -> &'static str {
            "stuck"
        }

        fn accept<'a>(&'a self, _report: &'a ChangeReport) -> NotifyFuture<'a> {
            Box::pin(async move {
                self.0.notified().await;
                Err(NotifyError::Delivery("nope".to_string()))
            })
        }
    }

    fn report(source: &str) -> ChangeReport {
        ChangeReport::new(
            SourceId::new(source),
            Local::now(),
            vec![ChangeEntry::added(1, "x")],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn delivers_in_submission_order_and_drains_on_drop() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (sink, writer) = ReportSink::spawn(Box::new(Collect(Arc::clone(&seen))), 8);

        for name in ["a", "b", "c"] {
            sink.notify(report(name)).unwrap();
        }
        assert_eq!(sink.counters().accepted, 3);
        drop(sink);
        writer.await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn full_queue_rejects_without_waiting() {
        let release = Arc::new(Notify::new());
        let (sink, writer) = ReportSink::spawn(Box::new(Stuck(Arc::clone(&release))), 1);

        // First report is taken by the writer (and blocks there), the second
        // fills the queue, the third has nowhere to go.
        sink.notify(report("a")).unwrap();
        tokio::task::yield_now().await;
        sink.notify(report("b")).unwrap();
        assert!(matches!(sink.notify(report("c")), Err(NotifyError::QueueFull)));

        release.notify_one();
        tokio::task::yield_now().await;
        release.notify_one();

        assert_eq!(sink.counters().dropped, 1);
        assert_eq!(sink.counters().accepted, 2);
        drop(sink);
        writer.await.unwrap();
    }
}
