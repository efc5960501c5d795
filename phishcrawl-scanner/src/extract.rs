//! Page feature extraction. Everything here is a pure function of a parsed document.

use crate::link::is_suspicious;
use crate::result::{FeatureRecord, JavaScript, StructuralCounts};
use crate::task::Label;
use scraper::{Html, Selector};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Characters counted by `num_special_chars`
pub const SPECIAL_CHARS: [char; 5] = ['@', '-', '_', '%', '~'];

/// Upper bound on the visible-text excerpt, in characters
pub const TEXT_EXCERPT_LEN: usize = 500;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static META: LazyLock<Selector> = LazyLock::new(|| selector("meta"));
static META_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| selector("meta[name='description']"));
static SCRIPT: LazyLock<Selector> = LazyLock::new(|| selector("script"));
static IFRAME: LazyLock<Selector> = LazyLock::new(|| selector("iframe"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
static BODY: LazyLock<Selector> = LazyLock::new(|| selector("body"));

/// Build the feature record for a fetched page
pub fn extract(document: &Html, url: &str, label: Label, depth: usize) -> FeatureRecord {
    let anchors = anchor_targets(document);
    let javascript = extract_javascript(document);

    let structural_counts = StructuralCounts {
        num_scripts: document.select(&SCRIPT).count(),
        num_iframes: document.select(&IFRAME).count(),
        num_external_links: count_external_links(&anchors),
        num_special_chars: count_special_chars(url),
    };

    FeatureRecord {
        url: url.to_string(),
        label,
        depth,
        structural_counts,
        title: extract_title(document),
        meta_description: extract_meta_description(document),
        metadata: extract_metadata(document),
        has_obfuscated_js: has_obfuscated_js(&javascript.inline),
        suspicious_links: anchors
            .into_iter()
            .filter(|href| is_suspicious(href))
            .collect(),
        javascript,
        text: None,
    }
}

/// Raw `href` values of every anchor, in document order
pub fn anchor_targets(document: &Html) -> Vec<String> {
    document
        .select(&ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .map(str::to_string)
        .collect()
}

pub fn count_special_chars(url: &str) -> usize {
    url.chars().filter(|c| SPECIAL_CHARS.contains(c)).count()
}

/// Anchors whose raw target starts with "http"; relative links never count
pub fn count_external_links(anchors: &[String]) -> usize {
    anchors.iter().filter(|href| href.starts_with("http")).count()
}

pub fn extract_title(document: &Html) -> Option<String> {
    document
        .select(&TITLE)
        .flat_map(|title| title.text())
        .next()
        .map(str::to_string)
}

pub fn extract_meta_description(document: &Html) -> Option<String> {
    document
        .select(&META_DESCRIPTION)
        .find_map(|meta| meta.value().attr("content"))
        .map(str::to_string)
}

/// Name/content pairs of every meta tag carrying both; a repeated name keeps the last value
pub fn extract_metadata(document: &Html) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();
    for meta in document.select(&META) {
        let element = meta.value();
        if let (Some(name), Some(content)) = (element.attr("name"), element.attr("content"))
            && !name.is_empty()
            && !content.is_empty()
        {
            metadata.insert(name.to_string(), content.to_string());
        }
    }
    metadata
}

pub fn extract_javascript(document: &Html) -> JavaScript {
    let mut javascript = JavaScript::default();
    for script in document.select(&SCRIPT) {
        let body: String = script.text().collect();
        if !body.is_empty() {
            javascript.inline.push(body);
        }
        if let Some(src) = script.value().attr("src") {
            javascript.external.push(src.to_string());
        }
    }
    javascript
}

/// `eval(` combined with `base64` in the same inline script, matched exactly
pub fn has_obfuscated_js(inline_scripts: &[String]) -> bool {
    inline_scripts
        .iter()
        .any(|script| script.contains("eval(") && script.contains("base64"))
}

/// Text nodes below the body's child elements, space-joined and cut to [`TEXT_EXCERPT_LEN`]
pub fn visible_text(document: &Html) -> String {
    let Some(body) = document.select(&BODY).next() else {
        return String::new();
    };

    let parts: Vec<String> = body
        .descendants()
        .filter(|node| node.parent().is_some_and(|parent| parent.id() != body.id()))
        .filter_map(|node| node.value().as_text().map(|text| String::from(&**text)))
        .collect();

    parts
        .join(" ")
        .trim()
        .chars()
        .take(TEXT_EXCERPT_LEN)
        .collect()
}
