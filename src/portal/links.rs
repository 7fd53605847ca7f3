//! Anchor extraction and URL-shape classification.
//!
//! The portal's navigation is driven by descriptive anchor text, so pages
//! are reduced to a text → absolute-URL map and then filtered by the URL
//! shape of each hierarchy level.

use html_scraper::{Html, Selector};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use url::Url;

use crate::portal::clean_text;

static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Institute links carry a facility-code path segment.
pub static INSTITUTE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Facult/[A-Z]+(/|$)").unwrap());

/// Department links nest two all-caps segments under `Facult`.
pub static DEPARTMENT_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/Facult/[A-Z]+/[A-Z]+(/default\.aspx)?$").unwrap());

/// Program links carry a `NN.NN.NN` program-code segment.
pub static PROGRAM_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\d{2}\.\d{2}\.\d{2}[^/]*(/default\.aspx)?$").unwrap());

/// Extracts all anchors as a text → absolute-URL map. Relative hrefs are
/// resolved against `base`. Anchors sharing identical text overwrite each
/// other, later wins; the portal's anchors are unique in practice.
pub fn extract_links(html: &str, base: &Url) -> HashMap<String, String> {
    let document = Html::parse_document(html);
    let mut links = HashMap::new();
    for anchor in document.select(&ANCHOR) {
        let Some(href) = anchor.attr("href") else {
            continue;
        };
        let absolute = if href.starts_with("http") {
            href.to_owned()
        } else {
            match base.join(href) {
                Ok(resolved) => resolved.to_string(),
                Err(_) => continue,
            }
        };
        let text = clean_text(&anchor.text().collect::<String>());
        links.insert(text, absolute);
    }
    links
}

/// Keeps entries whose URL matches `pattern` anywhere (unanchored search).
pub fn filter_links(links: &HashMap<String, String>, pattern: &Regex) -> HashMap<String, String> {
    links
        .iter()
        .filter(|(_, url)| pattern.is_match(url))
        .map(|(name, url)| (name.clone(), url.clone()))
        .collect()
}
