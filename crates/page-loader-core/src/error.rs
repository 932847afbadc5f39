//! Error taxonomy for a page load run.
//!
//! Every variant is fatal: the orchestrator stops at the first one and hands it
//! back to the caller unchanged. Markup never produces an error (parsing is
//! best-effort), so there is no parse variant.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    /// The page URL is not an absolute URL with a host.
    #[error("invalid page URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// No response was received at all (DNS, refused connection, reset, timeout).
    #[error("The request was made at {url} but no response was received: {source}")]
    Transport {
        url: String,
        #[source]
        source: curl::Error,
    },

    /// A response arrived with a failing status code (>= 400).
    #[error("'{url}' request failed with status code {status}")]
    HttpStatus { url: String, status: u32 },

    /// Directory creation or file write failed. `source` is the OS error as-is.
    #[error("{op} '{}': {source}", path.display())]
    Filesystem {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The transfer was aborted because another download in the same run failed.
    #[error("request to {url} was cancelled")]
    Cancelled { url: String },

    /// The curl handle could not be configured (bad option, out of memory).
    #[error("could not configure request for {url}: {source}")]
    Client {
        url: String,
        #[source]
        source: curl::Error,
    },
}

impl LoadError {
    pub(crate) fn filesystem(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        LoadError::Filesystem {
            op,
            path: path.into(),
            source,
        }
    }

    /// True for the variant produced by cooperative cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LoadError::Cancelled { .. })
    }
}

pub type Result<T, E = LoadError> = std::result::Result<T, E>;
