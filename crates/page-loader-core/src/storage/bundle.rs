//! Where one run writes its files.

use crate::naming::{self, NameKind};
use crate::rewrite::PlannedAsset;
use std::path::{Path, PathBuf};
use url::Url;

/// Output locations for a page and its assets, derived from the page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputBundle {
    /// Page name without extension, e.g. `ru-hexlet-io-courses`.
    pub base_name: String,
    /// `base_name` + `_files`; also the prefix of every rewritten reference.
    pub assets_dir_name: String,
    /// `output_dir/<page>.html`.
    pub page_file_path: PathBuf,
    /// `output_dir/<base_name>_files`.
    pub assets_dir_path: PathBuf,
}

impl OutputBundle {
    pub fn new(page_url: &Url, output_dir: &Path) -> Self {
        let base_name = naming::page_stem(page_url);
        let assets_dir_name = naming::assets_dir_name(page_url);
        let page_file_path = output_dir.join(naming::derive_name(page_url, NameKind::Page));
        let assets_dir_path = output_dir.join(&assets_dir_name);
        Self {
            base_name,
            assets_dir_name,
            page_file_path,
            assets_dir_path,
        }
    }

    /// Absolute (or output-dir relative) path the planned asset is written to.
    pub fn asset_path(&self, asset: &PlannedAsset) -> PathBuf {
        self.assets_dir_path.join(&asset.file_name)
    }
}
