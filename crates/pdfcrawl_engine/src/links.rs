use std::collections::HashSet;

use scraper::{Html, Selector};

/// Raw `href` values of every `<a>` in the document, first occurrence order.
///
/// Anchors without an `href` are skipped; nothing is resolved or filtered
/// here.
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let Ok(anchor_sel) = Selector::parse("a") else {
        return Vec::new();
    };
    let document = Html::parse_document(html);

    let mut seen = HashSet::new();
    document
        .select(&anchor_sel)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter(|href| seen.insert(*href))
        .map(str::to_string)
        .collect()
}
