// src/fetch/real.rs

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use crate::fetch::content::Content;
use crate::fetch::scripts::extract_script_refs;
use crate::fetch::{FetchError, FetchFuture, Fetcher};
use crate::fs::{FileSystem, RealFileSystem};
use crate::source::SourceDescriptor;
use crate::types::SourceKind;

const USER_AGENT: &str = concat!("changewatch/", env!("CARGO_PKG_VERSION"));

/// Fetcher used in production: local files through a [`FileSystem`], remote
/// documents through one shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct RealFetcher {
    client: Client,
    fs: Arc<dyn FileSystem>,
}

impl RealFetcher {
    /// Build a fetcher whose HTTP requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            client,
            fs: Arc::new(RealFileSystem),
        })
    }

    /// Read local files through another filesystem (e.g. an in-memory mock).
    pub fn with_file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    async fn read_file(&self, path: &str) -> Result<String, FetchError> {
        let fs = Arc::clone(&self.fs);
        let owned = PathBuf::from(path);

        let read = tokio::task::spawn_blocking(move || fs.read(&owned))
            .await
            .map_err(|e| FetchError::Io {
                path: path.to_string(),
                source: std::io::Error::other(e),
            })?;

        let bytes = read.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FetchError::NotFound(path.to_string()),
            _ => FetchError::Io {
                path: path.to_string(),
                source: e,
            },
        })?;

        decode(path, bytes)
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        debug!(url, "fetching remote document");

        let http_err = |source: reqwest::Error| FetchError::Http {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(http_err)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(FetchError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(http_err)?;
        decode(url, bytes.to_vec())
    }
}

fn decode(location: &str, bytes: Vec<u8>) -> Result<String, FetchError> {
    String::from_utf8(bytes).map_err(|_| FetchError::Decode(location.to_string()))
}

impl Fetcher for RealFetcher {
    fn fetch<'a>(&'a self, source: &'a SourceDescriptor) -> FetchFuture<'a> {
        Box::pin(async move {
            let location = source.location();
            match source.kind() {
                SourceKind::File => {
                    let text = self.read_file(location).await?;
                    Ok(Content::from_text(&text))
                }
                SourceKind::Document => {
                    let text = self.get_text(location).await?;
                    Ok(Content::from_text(&text))
                }
                SourceKind::Scripts => {
                    let html = self.get_text(location).await?;
                    let base = if source.resolve_scripts() {
                        Url::parse(location).ok()
                    } else {
                        None
                    };
                    Ok(Content::Scripts(extract_script_refs(&html, base.as_ref())))
                }
            }
        })
    }
}
