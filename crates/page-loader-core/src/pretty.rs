//! Deterministic pretty-printer for parsed markup.
//!
//! Output is a pure function of the tree. Block-level elements get their own
//! lines with two spaces of indentation per level. Inside an element, line
//! breaks are only placed where the markup already had whitespace (or next to
//! a block-level child), so inline content such as `<b>world</b>!` is never
//! split and the rendered text does not change. Runs of ASCII whitespace
//! collapse to one space. Raw-text elements (`script`, `style`, ...) keep
//! their contents verbatim and `pre`/`textarea` keep theirs unindented.
//! Formatting a re-parse of the output yields the same text.

use crate::scan::Document;
use scraper::node::Element;
use scraper::{ElementRef, Node};

const INDENT: &str = "  ";

/// Widest inline content (in chars) joined onto a single line with its tags.
const MAX_INLINE_WIDTH: usize = 80;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "noscript",
];

const PREFORMATTED_ELEMENTS: &[&str] = &["pre", "textarea", "listing"];

/// Elements that do not render inline, so whitespace around them is not
/// visible and a line break next to them is free. Everything else is inline.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "area", "article", "aside", "base", "blockquote", "body", "caption", "center",
    "col", "colgroup", "datalist", "dd", "details", "dialog", "dir", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "frame", "frameset", "h1", "h2", "h3",
    "h4", "h5", "h6", "head", "header", "hgroup", "hr", "html", "legend", "li", "link", "listing",
    "main", "menu", "meta", "nav", "noembed", "noframes", "noscript", "ol", "optgroup", "option",
    "p", "param", "pre", "script", "section", "source", "style", "summary", "table", "tbody",
    "td", "template", "tfoot", "th", "thead", "title", "tr", "track", "ul", "xmp",
];

fn is_block(name: &str) -> bool {
    BLOCK_ELEMENTS.contains(&name)
}

/// Formats the whole document, doctype included. Ends with a newline.
pub fn format_document(document: &Document) -> String {
    let mut f = Formatter::default();
    for child in document.html.tree.root().children() {
        match child.value() {
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    f.element(el, 0);
                }
            }
            other => f.leaf(other, 0),
        }
    }
    f.out
}

/// One output line inside a block element.
enum Line<'a> {
    /// A block-level child, laid out recursively.
    Block(ElementRef<'a>),
    /// Inline content already serialized; never broken further.
    Inline(String),
}

#[derive(Default)]
struct Formatter {
    out: String,
}

impl Formatter {
    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Doctype, comment or text outside the root element.
    fn leaf(&mut self, node: &Node, depth: usize) {
        match node {
            Node::Doctype(doctype) => {
                let line = format!("<!DOCTYPE {}>", doctype.name());
                self.line(depth, &line);
            }
            Node::Comment(comment) => {
                let line = format!("<!--{}-->", &*comment.comment);
                self.line(depth, &line);
            }
            Node::Text(text) => {
                let collapsed = collapse_whitespace(&text.text);
                if !collapsed.is_empty() {
                    let escaped = escape_text(&collapsed);
                    self.line(depth, &escaped);
                }
            }
            _ => {}
        }
    }

    fn element(&mut self, el: ElementRef<'_>, depth: usize) {
        let value = el.value();
        let name = value.name();
        let open = open_tag(value);

        if VOID_ELEMENTS.contains(&name) {
            self.line(depth, &open);
            return;
        }

        if RAW_TEXT_ELEMENTS.contains(&name) && all_text(el) {
            let raw: String = el.text().collect();
            let body = trim_blank_edges(&raw);
            if body.is_empty() {
                self.line(depth, &format!("{open}</{name}>"));
            } else {
                self.line(depth, &open);
                self.out.push_str(body);
                self.out.push('\n');
                self.line(depth, &format!("</{name}>"));
            }
            return;
        }

        if PREFORMATTED_ELEMENTS.contains(&name) {
            let body = preformatted_body(el);
            self.line(depth, &format!("{open}{body}</{name}>"));
            return;
        }

        let lines = layout(el);
        if lines.is_empty() {
            self.line(depth, &format!("{open}</{name}>"));
            return;
        }
        if let Some(joined) = join_inline(&lines) {
            self.line(depth, &format!("{open}{joined}</{name}>"));
            return;
        }

        self.line(depth, &open);
        for line in lines {
            match line {
                Line::Block(child) => self.element(child, depth + 1),
                Line::Inline(text) => self.line(depth + 1, &text),
            }
        }
        self.line(depth, &format!("</{name}>"));
    }
}

/// Splits the children of a block element into lines. A break is allowed
/// only at existing whitespace or around a block-level child.
fn layout(el: ElementRef<'_>) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut current = String::new();

    fn flush(lines: &mut Vec<Line<'_>>, current: &mut String) {
        if !current.is_empty() {
            lines.push(Line::Inline(std::mem::take(current)));
        }
    }

    for child in el.children() {
        match child.value() {
            Node::Text(t) => {
                let core = collapse_whitespace(&t.text);
                if core.is_empty() {
                    if !t.text.is_empty() {
                        flush(&mut lines, &mut current);
                    }
                    continue;
                }
                if t.text.starts_with(|c: char| c.is_ascii_whitespace()) {
                    flush(&mut lines, &mut current);
                }
                current.push_str(&escape_text(&core));
                if t.text.ends_with(|c: char| c.is_ascii_whitespace()) {
                    flush(&mut lines, &mut current);
                }
            }
            Node::Comment(c) => push_comment(&mut current, &c.comment),
            Node::Element(_) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                if is_block(child_el.value().name()) {
                    flush(&mut lines, &mut current);
                    lines.push(Line::Block(child_el));
                } else {
                    inline_markup(child_el, &mut current);
                }
            }
            _ => {}
        }
    }
    flush(&mut lines, &mut current);
    lines
}

/// Every break in `lines` sits on whitespace, so all-inline content can be
/// rejoined with single spaces when it is short enough.
fn join_inline(lines: &[Line<'_>]) -> Option<String> {
    let mut parts = Vec::with_capacity(lines.len());
    for line in lines {
        match line {
            Line::Inline(text) if !text.contains('\n') => parts.push(text.as_str()),
            _ => return None,
        }
    }
    let joined = parts.join(" ");
    (joined.chars().count() <= MAX_INLINE_WIDTH).then_some(joined)
}

/// Serializes `el` on one line. Whitespace runs collapse to one space but are
/// never dropped or added.
fn inline_markup(el: ElementRef<'_>, out: &mut String) {
    let value = el.value();
    let name = value.name();
    out.push_str(&open_tag(value));
    if VOID_ELEMENTS.contains(&name) {
        return;
    }
    if PREFORMATTED_ELEMENTS.contains(&name) {
        out.push_str(&preformatted_body(el));
    } else if RAW_TEXT_ELEMENTS.contains(&name) && all_text(el) {
        out.extend(el.text());
    } else {
        for child in el.children() {
            match child.value() {
                Node::Text(t) => out.push_str(&escape_text(&collapse_runs(&t.text))),
                Node::Comment(c) => push_comment(out, &c.comment),
                Node::Element(_) => {
                    if let Some(child_el) = ElementRef::wrap(child) {
                        inline_markup(child_el, out);
                    }
                }
                _ => {}
            }
        }
    }
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Contents of a `pre`-like element with nothing added or removed.
fn preformatted_body(el: ElementRef<'_>) -> String {
    let mut inner = String::new();
    verbatim_children(el, &mut inner);
    // The parser drops one newline right after the open tag; put it back.
    if inner.starts_with('\n') {
        inner.insert(0, '\n');
    }
    inner
}

fn verbatim_children(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(t) => out.push_str(&escape_text(&t.text)),
            Node::Comment(c) => push_comment(out, &c.comment),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    let value = child_el.value();
                    out.push_str(&open_tag(value));
                    if !VOID_ELEMENTS.contains(&value.name()) {
                        verbatim_children(child_el, out);
                        out.push_str("</");
                        out.push_str(value.name());
                        out.push('>');
                    }
                }
            }
            _ => {}
        }
    }
}

// `noscript` is raw text only when the parser ran with scripting on; check the children.
fn all_text(el: ElementRef<'_>) -> bool {
    el.children().all(|c| matches!(c.value(), Node::Text(_)))
}

fn push_comment(out: &mut String, comment: &str) {
    out.push_str("<!--");
    out.push_str(comment);
    out.push_str("-->");
}

fn open_tag(el: &Element) -> String {
    let mut tag = String::from("<");
    tag.push_str(el.name());
    for (name, value) in el.attrs.iter() {
        tag.push(' ');
        if let Some(prefix) = &name.prefix {
            tag.push_str(prefix);
            tag.push(':');
        }
        tag.push_str(&name.local);
        tag.push_str("=\"");
        tag.push_str(&escape_attribute(value));
        tag.push('"');
    }
    tag.push('>');
    tag
}

/// Collapses runs of ASCII whitespace to one space and trims. U+00A0 is kept.
pub fn collapse_whitespace(text: &str) -> String {
    text.split(|c: char| c.is_ascii_whitespace())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Like [`collapse_whitespace`] but keeps one space at either edge.
fn collapse_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn trim_blank_edges(raw: &str) -> &str {
    let trimmed_end = raw.trim_end();
    let start = trimmed_end
        .char_indices()
        .find(|&(_, c)| c != '\n' && c != '\r')
        .map(|(i, _)| i)
        .unwrap_or(trimmed_end.len());
    &trimmed_end[start..]
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
    out
}

pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
    out
}
