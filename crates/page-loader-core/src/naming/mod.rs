//! Local name derivation from remote URLs.
//!
//! Names are built from host + path only (scheme, query and fragment are
//! dropped), with every run of non-alphanumeric characters collapsed to `-`.
//! The same URL always yields the same name; nothing random or time-based is
//! mixed in. Two different URLs can still collapse to the same name (for
//! example ones that differ only in their query string); the later write wins.
//! Long stems are cut so that the name plus the writer's temp suffix fits in
//! [`NAME_MAX`] bytes.

mod path;
mod sanitize;

pub use path::split_extension;
pub use sanitize::{collapse_non_alphanumeric, truncate_name, NAME_MAX, SEPARATOR};

use crate::storage::TEMP_SUFFIX;
use url::Url;

/// Extension forced onto pages, and onto assets that have none.
pub const HTML_EXTENSION: &str = "html";

/// Suffix appended to the page stem to name the assets directory.
pub const ASSETS_DIR_SUFFIX: &str = "_files";

/// Stem used when host and path normalize to nothing.
const FALLBACK_STEM: &str = "index";

/// Longer extensions are cut to this many bytes.
const MAX_EXTENSION_LEN: usize = 32;

/// What the derived name will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    /// The saved page itself: keeps an `.html`/`.htm` extension, otherwise gets `.html`.
    Page,
    /// A localized asset: keeps its original extension.
    Asset,
}

/// Derives the local file name for `url`.
///
/// # Examples
///
/// - `https://ru.hexlet.io/courses`, `Page` → `ru-hexlet-io-courses.html`
/// - `https://ru.hexlet.io/assets/professions/nodejs.png`, `Asset` → `ru-hexlet-io-assets-professions-nodejs.png`
pub fn derive_name(url: &Url, kind: NameKind) -> String {
    let host = url.host_str().unwrap_or("");
    let (stem_path, ext) = match (kind, split_extension(url.path())) {
        (NameKind::Asset, (stem_path, Some(ext))) => (stem_path, ext),
        (NameKind::Page, (stem_path, Some(ext))) if is_html_extension(ext) => (stem_path, ext),
        _ => (url.path(), HTML_EXTENSION),
    };
    let ext = truncate_name(ext, MAX_EXTENSION_LEN);
    format!("{}.{}", stem(host, stem_path, ext.len() + 1), ext)
}

/// The page name without its extension; also the base of the assets directory name.
pub fn page_stem(url: &Url) -> String {
    let mut name = derive_name(url, NameKind::Page);
    // Stems never contain '.', so the last one starts the extension.
    if let Some(dot) = name.rfind('.') {
        name.truncate(dot);
    }
    name
}

/// Directory that holds the localized assets of the page at `url`.
pub fn assets_dir_name(url: &Url) -> String {
    format!("{}{}", page_stem(url), ASSETS_DIR_SUFFIX)
}

/// Normalized `host + path`, cut so that `extension_len` more bytes and the
/// temp suffix still fit in [`NAME_MAX`].
fn stem(host: &str, path: &str, extension_len: usize) -> String {
    let joined = format!("{host}{path}");
    let collapsed = collapse_non_alphanumeric(&joined);
    let budget = NAME_MAX - TEMP_SUFFIX.len() - extension_len;
    let cut = truncate_name(&collapsed, budget);
    if cut.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        cut.to_string()
    }
}

fn is_html_extension(ext: &str) -> bool {
    ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm")
}
