//! One page load, start to finish.
//!
//! Linear phases: fetch page → scan → rewrite → fetch assets → persist. Any
//! failure ends the run with that error. Nothing touches the filesystem until
//! every asset has been fetched, so network failures leave the output
//! directory untouched.

use crate::config::LoaderConfig;
use crate::downloader::download_all;
use crate::error::{LoadError, Result};
use crate::fetch::Fetcher;
use crate::pretty::format_document;
use crate::rewrite::rewrite;
use crate::scan::{scan, Document};
use crate::storage::{persist, OutputBundle};
use std::path::{Path, PathBuf};
use url::Url;

/// Progress of a run. `Failed` is reported through the returned error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    PageFetched,
    Scanned,
    Rewritten,
    AssetsFetched,
    Persisted,
    Done,
}

struct Run<'a> {
    url: &'a Url,
    phase: Phase,
}

impl<'a> Run<'a> {
    fn new(url: &'a Url) -> Self {
        tracing::debug!(url = %url, phase = ?Phase::Init, "page load started");
        Self {
            url,
            phase: Phase::Init,
        }
    }

    fn advance(&mut self, next: Phase) {
        tracing::debug!(url = %self.url, from = ?self.phase, to = ?next, "phase");
        self.phase = next;
    }
}

/// Validates the page URL: absolute, `http`/`https`, with a host.
pub fn parse_page_url(raw: &str) -> Result<Url> {
    let invalid = |reason: String| LoadError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme '{}'", other))),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

/// Loads pages with a fixed configuration. Holds no per-run state.
#[derive(Debug, Clone)]
pub struct PageLoader {
    config: LoaderConfig,
    fetcher: Fetcher,
}

impl Default for PageLoader {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

impl PageLoader {
    pub fn new(config: LoaderConfig) -> Self {
        let fetcher = Fetcher::new(config.fetch.clone());
        Self { config, fetcher }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Saves `page_url` and its same-origin assets under `output_dir`.
    /// Returns the path of the saved page.
    pub fn load(&self, page_url: &str, output_dir: &Path) -> Result<PathBuf> {
        let url = parse_page_url(page_url)?;
        let mut run = Run::new(&url);
        let result = self.run_phases(&url, output_dir, &mut run);
        if let Err(e) = &result {
            tracing::error!(url = %url, after = ?run.phase, "page load failed: {}", e);
        }
        result
    }

    fn run_phases(&self, url: &Url, output_dir: &Path, run: &mut Run<'_>) -> Result<PathBuf> {
        let page = self.fetcher.fetch(url)?;
        run.advance(Phase::PageFetched);

        let mut document = Document::parse_bytes(&page.body);
        let references = scan(&document, url);
        run.advance(Phase::Scanned);

        let bundle = OutputBundle::new(url, output_dir);
        let plan = rewrite(&mut document, &references, &bundle.assets_dir_name);
        run.advance(Phase::Rewritten);

        let assets = download_all(&self.fetcher, &plan, self.config.max_concurrent_downloads)?;
        run.advance(Phase::AssetsFetched);

        let markup = format_document(&document);
        let page_path = persist(&bundle, &markup, &assets)?;
        run.advance(Phase::Persisted);

        run.advance(Phase::Done);
        Ok(page_path)
    }
}

/// Loads `page_url` into `output_dir` with the default configuration.
pub fn load_page(page_url: &str, output_dir: &Path) -> Result<PathBuf> {
    PageLoader::default().load(page_url, output_dir)
}

/// Runs [`PageLoader::load`] on tokio's blocking pool.
pub async fn load_page_async(
    config: LoaderConfig,
    page_url: String,
    output_dir: PathBuf,
) -> Result<PathBuf> {
    let url_for_error = page_url.clone();
    let handle = tokio::task::spawn_blocking(move || {
        PageLoader::new(config).load(&page_url, &output_dir)
    });
    match handle.await {
        Ok(res) => res,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(_) => Err(LoadError::Cancelled { url: url_for_error }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        assert!(parse_page_url("https://ru.hexlet.io/courses").is_ok());
        assert!(parse_page_url("http://127.0.0.1:8080/").is_ok());
        assert!(parse_page_url("  https://example.com  ").is_ok());
    }

    #[test]
    fn rejects_relative_and_other_schemes() {
        for raw in ["/courses", "ru.hexlet.io/courses", "ftp://example.com/a", "file:///tmp/x.html"] {
            match parse_page_url(raw) {
                Err(LoadError::InvalidUrl { url, .. }) => assert_eq!(url, raw),
                other => panic!("expected InvalidUrl for {raw}, got {:?}", other),
            }
        }
    }

    #[test]
    fn invalid_url_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_page("not a url", dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::InvalidUrl { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
