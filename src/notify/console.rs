// src/notify/console.rs

use tokio::io::AsyncWriteExt;

use crate::notify::{Notifier, NotifyFuture};
use crate::report::ChangeReport;

/// Prints rendered reports to stdout (logs go to stderr).
#[derive(Debug, Default, Clone)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for ConsoleNotifier {
    fn name(&self) -> &'static str {
        "console"
    }

    fn accept<'a>(&'a self, report: &'a ChangeReport) -> NotifyFuture<'a> {
        Box::pin(async move {
            let rendered = report.render();
            let mut stdout = tokio::io::stdout();
            stdout.write_all(rendered.as_bytes()).await?;
            stdout.flush().await?;
            Ok(())
        })
    }
}
