// src/notify/telegram.rs

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::info;

use crate::notify::{Notifier, NotifyError, NotifyFuture};
use crate::report::ChangeReport;

pub const TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
pub const CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";
const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Bot credentials plus the API endpoint to talk to.
#[derive(Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
    pub api_base: String,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl TelegramConfig {
    /// Read `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID` from the process
    /// environment.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let get = |key: &str| lookup(key).filter(|v: &String| !v.trim().is_empty());
        Some(Self {
            token: get(TOKEN_VAR)?,
            chat_id: get(CHAT_ID_VAR)?,
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_base.trim_end_matches('/'),
            self.token,
            method
        )
    }
}

/// Uploads each rendered report to a chat via `sendDocument`, named after the
/// source's log file.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: Client,
    config: TelegramConfig,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { client, config })
    }
}

impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    fn accept<'a>(&'a self, report: &'a ChangeReport) -> NotifyFuture<'a> {
        Box::pin(async move {
            let file_name = report.source().log_file_name();
            let document = Part::bytes(report.render().into_bytes())
                .file_name(file_name.clone())
                .mime_str("text/plain")?;
            let form = Form::new()
                .text("chat_id", self.config.chat_id.clone())
                .part("document", document);

            self.client
                .post(self.config.method_url("sendDocument"))
                .multipart(form)
                .send()
                .await?
                .error_for_status()?;

            info!(source = %report.source(), file = %file_name, "report sent to telegram");
            Ok(())
        })
    }
}
