// src/notify/logfile.rs

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::errors::Result;
use crate::notify::{Notifier, NotifyFuture};
use crate::report::ChangeReport;
use crate::source::SourceId;

/// Appends every report to the source's log file in `dir`
/// (see [`SourceId::log_file_name`]).
#[derive(Debug, Clone)]
pub struct LogFileNotifier {
    dir: PathBuf,
}

impl LogFileNotifier {
    /// Use `dir`, creating it if needed.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, source: &SourceId) -> PathBuf {
        self.dir.join(source.log_file_name())
    }
}

impl Notifier for LogFileNotifier {
    fn name(&self) -> &'static str {
        "logfile"
    }

    fn accept<'a>(&'a self, report: &'a ChangeReport) -> NotifyFuture<'a> {
        Box::pin(async move {
            let path = self.path_for(report.source());
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .await?;
            file.write_all(report.render().as_bytes()).await?;
            file.flush().await?;
            debug!(path = ?path, "report appended to log file");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ChangeEntry;
    use chrono::Local;

    #[tokio::test]
    async fn appends_reports_per_source() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = LogFileNotifier::create(dir.path().join("logs")).unwrap();
        let source = SourceId::new("https://example.com/app");

        for text in ["first", "second"] {
            let report = ChangeReport::new(
                source.clone(),
                Local::now(),
                vec![ChangeEntry::added(1, text)],
            )
            .unwrap();
            notifier.accept(&report).await.unwrap();
        }

        let written = std::fs::read_to_string(notifier.path_for(&source)).unwrap();
        assert_eq!(written.matches("[!] Finished").count(), 2);
        assert!(written.contains("[+] line 1: first"));
        assert!(written.contains("[+] line 1: second"));
    }
}
