use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use changewatch::notify::{Notifier, NotifyError, NotifyFuture};
use changewatch::report::ChangeReport;

#[derive(Debug, Default)]
struct Shared {
    reports: Mutex<Vec<ChangeReport>>,
    rendered: Mutex<Vec<String>>,
    busy: AtomicBool,
    overlaps: AtomicUsize,
}

/// A fake notifier that:
/// - records every report it accepts (structured and rendered)
/// - can be told to fail or to take a while per report
/// - counts overlapping `accept` calls, which a correctly serialized sink
///   never produces
///
/// Clones share the same records, so a test can keep one handle while the
/// sink owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    shared: Arc<Shared>,
    fail: bool,
    delay: Option<Duration>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn reports(&self) -> Vec<ChangeReport> {
        self.shared.reports.lock().unwrap().clone()
    }

    pub fn rendered(&self) -> Vec<String> {
        self.shared.rendered.lock().unwrap().clone()
    }

    pub fn reports_for(&self, source: &str) -> Vec<ChangeReport> {
        self.reports()
            .into_iter()
            .filter(|r| r.source().as_str() == source)
            .collect()
    }

    pub fn overlaps(&self) -> usize {
        self.shared.overlaps.load(Ordering::SeqCst)
    }
}

impl Notifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn accept<'a>(&'a self, report: &'a ChangeReport) -> NotifyFuture<'a> {
        Box::pin(async move {
            if self.shared.busy.swap(true, Ordering::SeqCst) {
                self.shared.overlaps.fetch_add(1, Ordering::SeqCst);
            }

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            } else {
                tokio::task::yield_now().await;
            }

            let result = if self.fail {
                Err(NotifyError::Delivery("recording notifier set to fail".to_string()))
            } else {
                self.shared.reports.lock().unwrap().push(report.clone());
                self.shared.rendered.lock().unwrap().push(report.render());
                Ok(())
            };

            self.shared.busy.store(false, Ordering::SeqCst);
            result
        })
    }
}
