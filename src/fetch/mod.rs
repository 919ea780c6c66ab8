// src/fetch/mod.rs

//! Content retrieval.
//!
//! The polling loops talk to a [`Fetcher`] instead of doing I/O themselves.
//! Production code uses [`RealFetcher`] (filesystem + HTTP); tests can plug
//! in a scripted fetcher that returns canned content or failures.
//!
//! A fetcher has no retry policy of its own: every error is reported once and
//! the polling loop simply tries again on its next tick.

pub mod content;
pub mod real;
pub mod scripts;

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

use crate::source::SourceDescriptor;

pub use content::{Content, ScriptRef, ScriptSet};
pub use real::RealFetcher;
pub use scripts::extract_script_refs;

/// Why a fetch produced no usable content.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("source not found: {0}")]
    NotFound(String),

    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("content of {0} is not valid UTF-8 text")]
    Decode(String),

    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),

    #[error("expected {expected} content but got {actual}")]
    KindMismatch {
        expected: &'static str,
        actual: &'static str,
    },
}

pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<Content, FetchError>> + Send + 'a>>;

/// Trait abstracting how the current content of a source is retrieved.
pub trait Fetcher: Send + Sync {
    /// Fetch the current content of `source`.
    ///
    /// Line-mode sources must yield [`Content::Lines`]; script-set sources
    /// must yield [`Content::Scripts`].
    fn fetch<'a>(&'a self, source: &'a SourceDescriptor) -> FetchFuture<'a>;
}
