use std::sync::OnceLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::types::StructuralQuery;

fn anchor_selector() -> Option<&'static Selector> {
    static ANCHOR: OnceLock<Option<Selector>> = OnceLock::new();
    ANCHOR.get_or_init(|| Selector::parse("a[href]").ok()).as_ref()
}

/// Whether the inserted node itself (not a descendant) carries the item signature.
pub fn is_message_item(html: &str, item: &StructuralQuery) -> bool {
    let fragment = Html::parse_fragment(html);
    top_element(&fragment)
        .map(|element| item.selector().matches(&element))
        .unwrap_or(false)
}

/// Absolute outbound links of a node, in document order.
pub fn extract_links(html: &str, base: Option<&Url>) -> Vec<String> {
    let Some(anchor) = anchor_selector() else {
        return Vec::new();
    };
    let fragment = Html::parse_fragment(html);
    fragment
        .select(anchor)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| resolve_url(href, base))
        .map(String::from)
        .collect()
}

fn top_element(fragment: &Html) -> Option<ElementRef<'_>> {
    fragment.root_element().children().find_map(ElementRef::wrap)
}

fn resolve_url(reference: &str, base: Option<&Url>) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with('?') || lower.starts_with("javascript:") {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url);
    }
    base.and_then(|base| base.join(trimmed).ok())
}
