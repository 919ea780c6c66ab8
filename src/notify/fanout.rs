// src/notify/fanout.rs

use tracing::warn;

use crate::notify::{Notifier, NotifyError, NotifyFuture};
use crate::report::ChangeReport;

/// Delivers each report to every inner notifier, in order.
///
/// One failing notifier does not stop the others; the combined result is an
/// error naming every notifier that failed.
pub struct FanoutNotifier {
    inner: Vec<Box<dyn Notifier>>,
}

impl FanoutNotifier {
    pub fn new(inner: Vec<Box<dyn Notifier>>) -> Self {
        Self { inner }
    }
}

impl Notifier for FanoutNotifier {
    fn name(&self) -> &'static str {
        "fanout"
    }

    fn accept<'a>(&'a self, report: &'a ChangeReport) -> NotifyFuture<'a> {
        Box::pin(async move {
            let mut failures = Vec::new();
            for notifier in &self.inner {
                if let Err(e) = notifier.accept(report).await {
                    warn!(notifier = notifier.name(), error = %e, "notifier failed");
                    failures.push(format!("{}: {}", notifier.name(), e));
                }
            }
            if failures.is_empty() {
                Ok(())
            } else {
                Err(NotifyError::Delivery(failures.join("; ")))
            }
        })
    }
}
