//! Asset discovery in fetched markup.
//!
//! The markup is parsed with `scraper` (html5ever's error-recovering tree
//! builder), so malformed input never fails; it just yields whatever tree the
//! HTML5 algorithm builds. Discovery is a plain walk over that tree in document
//! order and can be repeated any number of times with the same result.

use scraper::Html;
use url::Url;

/// Element/attribute pairs whose value points at an embeddable resource.
pub const ASSET_ATTRIBUTES: &[(&str, &str)] = &[("img", "src"), ("link", "href"), ("script", "src")];

/// A parsed page. The tree is mutated in place by the rewriter.
pub struct Document {
    pub(crate) html: Html,
}

impl Document {
    /// Best-effort parse; never fails.
    pub fn parse(markup: &str) -> Self {
        let html = Html::parse_document(markup);
        if !html.errors.is_empty() {
            tracing::debug!(count = html.errors.len(), "markup parse recovered from errors");
        }
        Self { html }
    }

    /// Parse raw bytes, replacing invalid UTF-8 sequences.
    pub fn parse_bytes(markup: &[u8]) -> Self {
        Self::parse(&String::from_utf8_lossy(markup))
    }

    /// Value of `attribute` on the element at `element_index` (document order).
    #[cfg(test)]
    pub(crate) fn attribute(&self, element_index: usize, attribute: &str) -> Option<&str> {
        self.html
            .tree
            .root()
            .descendants()
            .nth(element_index)?
            .value()
            .as_element()?
            .attr(attribute)
    }
}

/// One localizable reference found in the markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    /// Absolute URL of the asset, resolved against the page URL.
    pub source_url: Url,
    pub tag_name: String,
    pub attribute_name: String,
    /// Position of the element among all tree nodes in document order.
    pub element_index: usize,
}

fn asset_attribute(tag_name: &str) -> Option<&'static str> {
    ASSET_ATTRIBUTES
        .iter()
        .find(|(tag, _)| *tag == tag_name)
        .map(|(_, attr)| *attr)
}

/// True when `candidate` has the same host as `base`. Scheme and port are not compared.
pub fn is_same_origin(base: &Url, candidate: &Url) -> bool {
    match (base.host_str(), candidate.host_str()) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}

/// Iterates same-origin asset references of `document` in document order.
///
/// Values that are empty or fail to resolve against `base_url` are skipped, as
/// are cross-origin and `data:` URLs (no host).
pub fn asset_references<'a>(
    document: &'a Document,
    base_url: &'a Url,
) -> impl Iterator<Item = AssetReference> + 'a {
    document
        .html
        .tree
        .root()
        .descendants()
        .enumerate()
        .filter_map(move |(element_index, node)| {
            let element = node.value().as_element()?;
            let tag_name = element.name();
            let attribute_name = asset_attribute(tag_name)?;
            let raw = element.attr(attribute_name)?.trim();
            if raw.is_empty() {
                return None;
            }
            let source_url = match base_url.join(raw) {
                Ok(u) => u,
                Err(e) => {
                    tracing::debug!(value = raw, "skipping unresolvable {}[{}]: {}", tag_name, attribute_name, e);
                    return None;
                }
            };
            if !is_same_origin(base_url, &source_url) {
                return None;
            }
            Some(AssetReference {
                source_url,
                tag_name: tag_name.to_string(),
                attribute_name: attribute_name.to_string(),
                element_index,
            })
        })
}

/// Collects [`asset_references`] into a vector.
pub fn scan(document: &Document, base_url: &Url) -> Vec<AssetReference> {
    let refs: Vec<AssetReference> = asset_references(document, base_url).collect();
    tracing::debug!(base = %base_url, count = refs.len(), "scanned markup for assets");
    refs
}
