//! Point asset references at their local copies and build the download plan.

use crate::naming::{derive_name, NameKind};
use crate::scan::{AssetReference, Document};
use scraper::Node;
use std::collections::HashSet;
use url::Url;

/// One asset to fetch and where it goes, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAsset {
    pub source_url: Url,
    /// Derived file name inside the assets directory.
    pub file_name: String,
    /// `assets_dir/file_name`, exactly as written into the markup.
    pub local_path: String,
}

/// Deduplicated assets in order of first appearance in the markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadPlan {
    entries: Vec<PlannedAsset>,
}

impl DownloadPlan {
    pub fn entries(&self) -> &[PlannedAsset] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlannedAsset> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a DownloadPlan {
    type Item = &'a PlannedAsset;
    type IntoIter = std::slice::Iter<'a, PlannedAsset>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Local relative path of an asset: `assets_dir/derived-name.ext`.
pub fn local_path(assets_dir_name: &str, source_url: &Url) -> (String, String) {
    let file_name = derive_name(source_url, NameKind::Asset);
    let path = format!("{}/{}", assets_dir_name, file_name);
    (file_name, path)
}

/// Replaces the value of `attribute` on `element`. Other attributes keep their values and order.
fn set_attribute(element: &mut scraper::node::Element, attribute: &str, value: &str) -> bool {
    let mut replaced = false;
    for (name, current) in element.attrs.iter_mut() {
        if &*name.local == attribute {
            *current = value.into();
            replaced = true;
        }
    }
    replaced
}

/// Rewrites every reference in `document` to its local path and returns the download plan.
///
/// All occurrences of a URL are rewritten; the plan lists each URL once.
pub fn rewrite(
    document: &mut Document,
    references: &[AssetReference],
    assets_dir_name: &str,
) -> DownloadPlan {
    let node_ids: Vec<_> = document
        .html
        .tree
        .root()
        .descendants()
        .map(|node| node.id())
        .collect();

    let mut seen: HashSet<Url> = HashSet::new();
    let mut plan = DownloadPlan::default();
    let mut rewritten = 0usize;

    for reference in references {
        let (file_name, path) = local_path(assets_dir_name, &reference.source_url);

        let Some(&id) = node_ids.get(reference.element_index) else {
            tracing::warn!(index = reference.element_index, "asset reference points past the tree");
            continue;
        };
        if let Some(mut node) = document.html.tree.get_mut(id) {
            if let Node::Element(element) = node.value() {
                if set_attribute(element, &reference.attribute_name, &path) {
                    rewritten += 1;
                }
            }
        }

        if seen.insert(reference.source_url.clone()) {
            plan.entries.push(PlannedAsset {
                source_url: reference.source_url.clone(),
                file_name,
                local_path: path,
            });
        }
    }

    tracing::debug!(rewritten, planned = plan.len(), "rewrote asset references");
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::scan;

    const ASSETS_DIR: &str = "ru-hexlet-io-courses_files";

    fn base() -> Url {
        Url::parse("https://ru.hexlet.io/courses").unwrap()
    }

    fn attribute_values(doc: &Document, tag: &str, attr: &str) -> Vec<String> {
        doc.html
            .tree
            .root()
            .descendants()
            .filter_map(|n| n.value().as_element())
            .filter(|e| e.name() == tag)
            .filter_map(|e| e.attr(attr).map(str::to_string))
            .collect()
    }

    #[test]
    fn duplicates_rewritten_everywhere_but_planned_once() {
        let mut doc = Document::parse(
            r#"<img src="/a.png"><img src="https://ru.hexlet.io/a.png"><link href="/s.css"><img src="a.png">"#,
        );
        let refs = scan(&doc, &base());
        assert_eq!(refs.len(), 4);

        let plan = rewrite(&mut doc, &refs, ASSETS_DIR);
        assert_eq!(plan.len(), 2);
        assert_eq!(
            plan.entries()[0].local_path,
            "ru-hexlet-io-courses_files/ru-hexlet-io-a.png"
        );
        assert_eq!(plan.entries()[0].file_name, "ru-hexlet-io-a.png");
        assert_eq!(
            plan.entries()[1].local_path,
            "ru-hexlet-io-courses_files/ru-hexlet-io-s.css"
        );

        let imgs = attribute_values(&doc, "img", "src");
        assert_eq!(imgs.len(), 3);
        assert!(imgs
            .iter()
            .all(|v| v == "ru-hexlet-io-courses_files/ru-hexlet-io-a.png"));
    }

    #[test]
    fn cross_origin_left_untouched() {
        let mut doc = Document::parse(
            r#"<script src="https://js.stripe.com/v3/"></script><script src="/packs/js/runtime.js"></script>"#,
        );
        let refs = scan(&doc, &base());
        let plan = rewrite(&mut doc, &refs, ASSETS_DIR);
        assert_eq!(plan.len(), 1);
        assert!(plan
            .iter()
            .all(|p| p.source_url.host_str() == Some("ru.hexlet.io")));
        assert_eq!(
            attribute_values(&doc, "script", "src"),
            vec![
                "https://js.stripe.com/v3/".to_string(),
                "ru-hexlet-io-courses_files/ru-hexlet-io-packs-js-runtime.js".to_string(),
            ]
        );
    }

    #[test]
    fn other_attributes_survive() {
        let mut doc = Document::parse(r#"<link rel="stylesheet" media="all" href="/assets/application.css">"#);
        let refs = scan(&doc, &base());
        rewrite(&mut doc, &refs, ASSETS_DIR);
        assert_eq!(attribute_values(&doc, "link", "rel"), vec!["stylesheet"]);
        assert_eq!(attribute_values(&doc, "link", "media"), vec!["all"]);
        assert_eq!(
            attribute_values(&doc, "link", "href"),
            vec!["ru-hexlet-io-courses_files/ru-hexlet-io-assets-application.css"]
        );
    }

    #[test]
    fn rewritten_markup_keeps_attribute_order() {
        let mut doc = Document::parse(
            r#"<link rel="stylesheet" media="all" href="/a.css"><link href="/courses" rel="canonical"><img alt="x" src="/i.png" width="10">"#,
        );
        let refs = scan(&doc, &base());
        rewrite(&mut doc, &refs, ASSETS_DIR);
        assert_eq!(
            crate::pretty::format_document(&doc),
            "<html>\n\
             \x20 <head>\n\
             \x20   <link rel=\"stylesheet\" media=\"all\" href=\"ru-hexlet-io-courses_files/ru-hexlet-io-a.css\">\n\
             \x20   <link href=\"ru-hexlet-io-courses_files/ru-hexlet-io-courses.html\" rel=\"canonical\">\n\
             \x20 </head>\n\
             \x20 <body><img alt=\"x\" src=\"ru-hexlet-io-courses_files/ru-hexlet-io-i.png\" width=\"10\"></body>\n\
             </html>\n"
        );
    }

    #[test]
    fn n_elements_m_urls() {
        let mut doc = Document::parse(
            r#"<img src="/1.png"><img src="/2.png"><img src="/1.png"><script src="/1.js"></script><script src="/1.js"></script>"#,
        );
        let refs = scan(&doc, &base());
        let plan = rewrite(&mut doc, &refs, ASSETS_DIR);
        assert_eq!(refs.len(), 5);
        assert_eq!(plan.len(), 3);
        let rewritten = attribute_values(&doc, "img", "src")
            .into_iter()
            .chain(attribute_values(&doc, "script", "src"))
            .filter(|v| v.starts_with("ru-hexlet-io-courses_files/"))
            .count();
        assert_eq!(rewritten, 5);
    }

    #[test]
    fn empty_reference_list_is_a_noop() {
        let mut doc = Document::parse("<p>nothing here</p>");
        let plan = rewrite(&mut doc, &[], ASSETS_DIR);
        assert!(plan.is_empty());
    }
}
