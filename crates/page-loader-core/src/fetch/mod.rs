//! HTTP GET for the page and its assets.
//!
//! Uses the curl crate (libcurl easy handle). Redirects are followed by curl;
//! nothing is retried. Failures are split into "no response at all"
//! ([`LoadError::Transport`]) and "response with a failing status"
//! ([`LoadError::HttpStatus`]).

mod classify;

pub use classify::{check_status, classify_perform_error};

use crate::config::FetchConfig;
use crate::error::{LoadError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use url::Url;

/// A successfully fetched resource.
#[derive(Debug, Clone)]
pub struct FetchedResource {
    /// The URL that was requested (before redirects).
    pub url: Url,
    /// Final HTTP status (always 2xx).
    pub status: u32,
    /// `Content-Type` of the final response, if the server sent one.
    pub content_type: Option<String>,
    /// Response body exactly as received.
    pub body: Vec<u8>,
}

/// Blocking HTTP fetcher. One curl handle per request; cheap to clone.
///
/// Runs in the current thread; call from `spawn_blocking` if used from async code.
#[derive(Debug, Clone)]
pub struct Fetcher {
    config: FetchConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// A copy of this fetcher whose transfers abort once `flag` is set.
    pub fn with_cancel_flag(&self, flag: Arc<AtomicBool>) -> Self {
        Self {
            config: self.config.clone(),
            cancel: Some(flag),
        }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|f| f.load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    fn configure(&self, easy: &mut curl::easy::Easy, url: &Url) -> std::result::Result<(), curl::Error> {
        easy.url(url.as_str())?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(self.config.max_redirects)?;
        easy.connect_timeout(self.config.connect_timeout())?;
        easy.timeout(self.config.timeout())?;
        if let Some(agent) = &self.config.user_agent {
            easy.useragent(agent)?;
        }
        if self.cancel.is_some() {
            // Progress callbacks are off by default; they are the only hook to abort mid-transfer.
            easy.progress(true)?;
        }
        Ok(())
    }

    fn perform_into(
        &self,
        easy: &mut curl::easy::Easy,
        body: &mut Vec<u8>,
    ) -> std::result::Result<(), curl::Error> {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        if let Some(flag) = &self.cancel {
            let flag = Arc::clone(flag);
            transfer.progress_function(move |_, _, _, _| !flag.load(Ordering::Relaxed))?;
        }
        transfer.perform()
    }

    /// Performs a GET for `url` and returns the body on a 2xx response.
    pub fn fetch(&self, url: &Url) -> Result<FetchedResource> {
        if self.is_cancelled() {
            return Err(LoadError::Cancelled {
                url: url.to_string(),
            });
        }

        let mut easy = curl::easy::Easy::new();
        self.configure(&mut easy, url)
            .map_err(|source| LoadError::Client {
                url: url.to_string(),
                source,
            })?;

        let mut body: Vec<u8> = Vec::new();
        let performed = self.perform_into(&mut easy, &mut body);
        if let Err(err) = performed {
            let e = classify_perform_error(url, err, self.is_cancelled());
            tracing::debug!(url = %url, "GET failed: {}", e);
            return Err(e);
        }

        let status = easy.response_code().map_err(|err| LoadError::Transport {
            url: url.to_string(),
            source: err,
        })?;
        check_status(url, status)?;

        let content_type = easy.content_type().ok().flatten().map(str::to_string);
        tracing::debug!(
            url = %url,
            status,
            bytes = body.len(),
            content_type = content_type.as_deref().unwrap_or("-"),
            "GET ok"
        );

        Ok(FetchedResource {
            url: url.clone(),
            status,
            content_type,
            body,
        })
    }
}
