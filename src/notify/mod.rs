// src/notify/mod.rs

//! Report delivery.
//!
//! The polling loops never talk to a concrete transport. They hand reports
//! to a [`ReportSink`], whose single writer task passes them one at a time to
//! a [`Notifier`]. That writer is the only place reports are delivered, so
//! output from different sources is never interleaved.
//!
//! - [`console`]: print to stdout.
//! - [`logfile`]: append to one log file per source.
//! - [`telegram`]: upload to a Telegram chat as a document.
//! - [`fanout`]: deliver to several notifiers.

pub mod console;
pub mod fanout;
pub mod logfile;
pub mod sink;
pub mod telegram;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;
use tracing::info;

use crate::config::NotifySection;
use crate::errors::{ChangewatchError, Result};
use crate::report::ChangeReport;

pub use console::ConsoleNotifier;
pub use fanout::FanoutNotifier;
pub use logfile::LogFileNotifier;
pub use sink::{ReportSink, SinkCounters};
pub use telegram::{TelegramConfig, TelegramNotifier};

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("report queue is full; report dropped")]
    QueueFull,

    #[error("report sink is closed")]
    Closed,

    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type NotifyFuture<'a> = Pin<Box<dyn Future<Output = std::result::Result<(), NotifyError>> + Send + 'a>>;

/// Something that can take delivery of a change report.
///
/// `Ok` means the notifier did its part (wrote the file, got a 2xx from the
/// remote API); it is not a guarantee that a human saw it.
pub trait Notifier: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn accept<'a>(&'a self, report: &'a ChangeReport) -> NotifyFuture<'a>;
}

/// Build the notifier described by the `[notify]` section.
///
/// Fails when nothing is enabled (reports would silently vanish) or when a
/// transport cannot be set up; both are startup errors.
pub fn build_notifier(section: &NotifySection) -> Result<Box<dyn Notifier>> {
    let mut notifiers: Vec<Box<dyn Notifier>> = Vec::new();

    if section.console {
        notifiers.push(Box::new(ConsoleNotifier::new()));
    }

    if let Some(ref dir) = section.log_dir {
        notifiers.push(Box::new(LogFileNotifier::create(dir)?));
    }

    if section.telegram {
        let config = TelegramConfig::from_env().ok_or_else(|| {
            ChangewatchError::ConfigError(
                "telegram delivery needs TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID".to_string(),
            )
        })?;
        notifiers.push(Box::new(
            TelegramNotifier::new(config).map_err(|e| ChangewatchError::Notify(e.to_string()))?,
        ));
    }

    let names: Vec<_> = notifiers.iter().map(|n| n.name()).collect();
    info!(?names, "report notifiers configured");

    match notifiers.len() {
        0 => Err(ChangewatchError::ConfigError(
            "no notifier enabled; enable console, log_dir or telegram".to_string(),
        )),
        1 => Ok(notifiers.remove(0)),
        _ => Ok(Box::new(FanoutNotifier::new(notifiers))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_enabled_is_a_config_error() {
        let section = NotifySection {
            console: false,
            log_dir: None,
            telegram: false,
        };
        assert!(matches!(
            build_notifier(&section),
            Err(ChangewatchError::ConfigError(_))
        ));
    }

    #[test]
    fn single_notifier_is_not_wrapped() {
        let notifier = build_notifier(&NotifySection::default()).unwrap();
        assert_eq!(notifier.name(), "console");
    }

    #[test]
    fn several_notifiers_fan_out() {
        let dir = tempfile::tempdir().unwrap();
        let section = NotifySection {
            console: true,
            log_dir: Some(dir.path().to_string_lossy().into_owned()),
            telegram: false,
        };
        assert_eq!(build_notifier(&section).unwrap().name(), "fanout");
    }
}
