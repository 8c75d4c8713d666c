//! The host page: the anchor points the pipeline renders into.
//!
//! Anchors are located by fixed attributes, never by position:
//! - `data-papers-target="library"`: grouped publication list
//! - `data-papers-target="featured"`: optional flat featured list
//! - `data-papers-filters`: optional filter controls
//! - `data-papers-empty`: optional "nothing matches" message
//! - `<script id="papers-data" type="application/json">`: optional inline copy of the data

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::render::{Element, RENDERED_ATTR, html::parse_children};

pub const TARGET_ATTR: &str = "data-papers-target";
pub const FILTERS_ATTR: &str = "data-papers-filters";
pub const EMPTY_ATTR: &str = "data-papers-empty";

pub const DEFAULT_EMPTY_TEXT: &str = "No publications match this filter.";

static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    // Attribute pairs: key="value" or key='value' (no backreferences in Rust regex)
    Regex::new(r#"(?i)([a-zA-Z_:\-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
});
static OPEN_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?is)<([a-zA-Z][a-zA-Z0-9-]*)\b([^>]*)>"#).unwrap());

#[derive(Debug, Clone)]
pub struct Page {
    /// Where the page itself was loaded from; relative data paths resolve against it.
    pub location: Url,
    pub library: Option<Element>,
    pub featured: Option<Element>,
    pub filters: Option<Element>,
    pub empty_state: Option<Element>,
    /// Raw text of the inline data block, if the page carries one.
    pub inline_data: Option<String>,
}

impl Page {
    /// A page with every anchor present and no inline data.
    pub fn standard(location: Url) -> Self {
        Page {
            location,
            library: Some(Element::new("div").with_attr(TARGET_ATTR, "library")),
            featured: Some(Element::new("div").with_attr(TARGET_ATTR, "featured")),
            filters: Some(Element::new("div").with_attr(FILTERS_ATTR, "")),
            empty_state: Some(empty_state(Element::new("p"), DEFAULT_EMPTY_TEXT)),
            inline_data: None,
        }
    }

    /// Locate the anchors in host markup.
    pub fn from_html(location: Url, html: &str, inline_data_id: &str) -> Self {
        let mut library = None;
        let mut featured = None;
        let mut filters = None;
        let mut empty = None;

        for cap in OPEN_TAG_RE.captures_iter(html) {
            let (Some(whole), Some(tag), Some(attrs)) = (cap.get(0), cap.get(1), cap.get(2)) else {
                continue;
            };
            let attrs = attrs.as_str();
            let tag = tag.as_str().to_ascii_lowercase();
            let rest = &html[whole.end()..];
            match parse_attr(attrs, TARGET_ATTR).as_deref() {
                Some("library") if library.is_none() => {
                    library = Some(container(&tag, attrs, rest))
                }
                Some("featured") if featured.is_none() => {
                    featured = Some(container(&tag, attrs, rest))
                }
                _ => {}
            }
            if filters.is_none() && has_bare_attr(attrs, FILTERS_ATTR) {
                let mut el = container(&tag, attrs, rest);
                el.set_attr(FILTERS_ATTR, "");
                filters = Some(el);
            }
            if empty.is_none() && has_bare_attr(attrs, EMPTY_ATTR) {
                let el = container(&tag, attrs, rest);
                let text = el.text().split_whitespace().collect::<Vec<_>>().join(" ");
                let text = if text.is_empty() {
                    DEFAULT_EMPTY_TEXT.to_string()
                } else {
                    text
                };
                empty = Some(empty_state(el, &text));
            }
        }

        Page {
            location,
            library,
            featured,
            filters,
            empty_state: empty,
            inline_data: inline_script(html, inline_data_id),
        }
    }

    pub fn data_url(&self, data_path: &str) -> Result<Url, url::ParseError> {
        self.location.join(data_path)
    }
}

/// Drop previously rendered nodes from `container` and append `nodes` in order.
pub fn replace_rendered(container: &mut Element, nodes: Vec<Element>) {
    container.children.retain(|child| match child {
        crate::render::Node::Element(e) => !e.has_attr(RENDERED_ATTR),
        crate::render::Node::Text(_) => true,
    });
    container
        .children
        .extend(nodes.into_iter().map(crate::render::Node::Element));
}

/// Content of `<script id="{id}" ...>...</script>`.
pub fn inline_script(html: &str, id: &str) -> Option<String> {
    let re = Regex::new(&format!(
        r#"(?is)<script\b[^>]*\bid\s*=\s*["']{}["'][^>]*>(.*?)</script>"#,
        regex::escape(id)
    ))
    .ok()?;
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

fn empty_state(mut el: Element, text: &str) -> Element {
    el.set_attr(EMPTY_ATTR, "");
    el.set_text(text);
    el.set_hidden(true);
    el
}

/// The anchor with its attributes and the static markup it already contains.
fn container(tag: &str, attrs: &str, rest: &str) -> Element {
    let mut el = element(tag, attrs);
    if !attrs.trim_end().ends_with('/') {
        el.children = parse_children(rest, tag);
    }
    el
}

fn element(tag: &str, attrs: &str) -> Element {
    ATTR_RE.captures_iter(attrs).fold(Element::new(tag), |el, cap| {
        let value = cap.get(2).or_else(|| cap.get(3)).map(|m| m.as_str()).unwrap_or("");
        el.with_attr(&cap[1].to_ascii_lowercase(), value)
    })
}

fn parse_attr(attrs: &str, name: &str) -> Option<String> {
    ATTR_RE
        .captures_iter(attrs)
        .find(|cap| cap[1].eq_ignore_ascii_case(name))
        .and_then(|cap| cap.get(2).or_else(|| cap.get(3)))
        .map(|m| m.as_str().to_string())
}

/// Attribute present with or without a value.
fn has_bare_attr(attrs: &str, name: &str) -> bool {
    attrs
        .split(|c: char| c.is_whitespace() || c == '=' || c == '/')
        .any(|tok| tok.eq_ignore_ascii_case(name))
}
