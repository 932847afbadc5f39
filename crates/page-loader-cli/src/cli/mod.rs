//! CLI for page-loader.

use anyhow::{Context, Result};
use clap::builder::RangedU64ValueParser;
use clap::Parser;
use page_loader_core::config::{self, LoaderConfig};
use page_loader_core::load_page_async;
use std::path::PathBuf;

/// Download a web page and its same-origin images, stylesheets and scripts.
#[derive(Debug, Parser)]
#[command(name = "page-loader", version)]
#[command(about = "Save a web page for offline viewing", long_about = None)]
pub struct Cli {
    /// Absolute http/https URL of the page.
    pub url: String,

    /// Directory to save into (defaults to the current directory).
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Maximum number of assets fetched at once.
    #[arg(
        short = 'j',
        long,
        value_name = "N",
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub concurrency: Option<usize>,

    /// TOML file with loader and HTTP settings.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub async fn run_from_args() -> Result<()> {
        Cli::parse().run().await
    }

    /// Builds the effective configuration: file (if any), then flags on top.
    pub fn loader_config(&self) -> Result<LoaderConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::load_from_path(path)?,
            None => LoaderConfig::default(),
        };
        if let Some(n) = self.concurrency {
            cfg.max_concurrent_downloads = n;
        }
        Ok(cfg)
    }

    pub fn output_dir(&self) -> Result<PathBuf> {
        match &self.output {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("current directory is not accessible"),
        }
    }

    pub async fn run(self) -> Result<()> {
        let cfg = self.loader_config()?;
        let output = self.output_dir()?;
        tracing::debug!("loaded config: {:?}", cfg);
        tracing::info!(url = %self.url, output = %output.display(), "saving page");

        let page_path = load_page_async(cfg, self.url, output).await?;
        println!(
            "Page was successfully downloaded into '{}'",
            page_path.display()
        );
        Ok(())
    }
}
