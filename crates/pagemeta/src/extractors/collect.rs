// ABOUTME: List-valued extraction rules: headings, images, and links.
// ABOUTME: Each collector preserves document order, filters, resolves references, and applies its cap.

use url::Url;

use crate::dom::{attr_of, text_of, Document};
use crate::extractors::rules::RuleConfig;
use crate::extractors::urls::{background_image_url, resolve_reference};

fn capped<I: Iterator<Item = String>>(items: I, cap: Option<usize>) -> Vec<String> {
    match cap {
        Some(n) => items.take(n).collect(),
        None => items.collect(),
    }
}

/// Text of the configured heading levels, length-filtered and capped.
pub fn collect_headings(doc: &Document, rules: &RuleConfig) -> Vec<String> {
    let Some(selector) = rules.heading_selector() else {
        return Vec::new();
    };
    let min = rules.min_heading_len.max(1);
    let elements = doc.select_all(&selector);
    let headings = elements
        .iter()
        .map(text_of)
        .filter(|t| t.chars().count() >= min);
    capped(headings, rules.max_headings)
}

/// Raw image reference carried by one candidate element.
fn image_candidate(el: &scraper::ElementRef<'_>) -> Option<String> {
    if el.value().name().eq_ignore_ascii_case("meta") {
        return attr_of(el, "content");
    }
    attr_of(el, "src").or_else(|| {
        el.value()
            .attr("style")
            .and_then(background_image_url)
    })
}

/// Image URLs from `img[src]`, inline background images, and `og:image`, in document order.
pub fn collect_images(doc: &Document, base: &Url, rules: &RuleConfig) -> Vec<String> {
    let candidates = doc.select_all(&rules.image_selector());
    let images = candidates
        .iter()
        .filter_map(image_candidate)
        .filter_map(|src| resolve_reference(base, &src));
    capped(images, rules.max_images)
}

/// Anchor hrefs resolved against `base`, in document order.
pub fn collect_links(doc: &Document, base: &Url, rules: &RuleConfig) -> Vec<String> {
    let anchors = doc.select_all("a");
    let links = anchors
        .iter()
        .filter_map(|a| attr_of(a, "href"))
        .filter_map(|href| resolve_reference(base, &href));
    capped(links, rules.max_links)
}
