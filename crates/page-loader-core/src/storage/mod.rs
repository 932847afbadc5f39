//! Writing the page and its assets to disk.
//!
//! The assets directory is created first with a plain (non-recursive) mkdir;
//! the output directory itself must already exist. Filesystem errors carry the
//! OS message and the offending path unchanged.

mod bundle;
mod writer;

pub use bundle::OutputBundle;
pub use writer::{temp_path, write_file, TEMP_SUFFIX};

use crate::downloader::DownloadedAsset;
use crate::error::{LoadError, Result};
use std::io;
use std::path::{Path, PathBuf};

/// Creates `dir` (parent must exist). An existing directory is fine, so re-runs overwrite.
pub fn create_assets_dir(dir: &Path) -> Result<()> {
    match std::fs::create_dir(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(LoadError::filesystem("mkdir", dir, e)),
    }
}

/// Writes the formatted page, then every asset in plan order. Returns the page path.
///
/// Stops at the first failure; files written before it stay on disk.
pub fn persist(bundle: &OutputBundle, page_markup: &str, assets: &[DownloadedAsset]) -> Result<PathBuf> {
    create_assets_dir(&bundle.assets_dir_path)?;
    write_file(&bundle.page_file_path, page_markup.as_bytes())?;
    for asset in assets {
        write_file(&bundle.asset_path(&asset.planned), &asset.resource.body)?;
    }
    tracing::info!(
        page = %bundle.page_file_path.display(),
        assets = assets.len(),
        "page persisted"
    );
    Ok(bundle.page_file_path.clone())
}
