// ABOUTME: Extraction rules applied to a parsed document to build an ExtractionResult.
// ABOUTME: Every rule degrades to a fallback value, so this stage never fails.

//! Extraction rules.
//!
//! Submodules:
//! - `compiled`: process-wide cache of compiled selectors.
//! - `select`: candidate providers and sentinel-terminated fallback chains.
//! - `rules`: the tunable `RuleConfig` and its presets.
//! - `urls`: reference resolution and background-image parsing.
//! - `collect`: the list-valued rules (headings, images, links).

pub mod collect;
pub mod compiled;
pub mod rules;
pub mod select;
pub mod urls;

use url::Url;

use crate::dom::Document;
use crate::result::{ExtractionResult, PageMeta};
use rules::RuleConfig;

/// Apply every rule to `doc`, resolving references against `base`.
pub fn extract_page(doc: &Document, base: &Url, rules: &RuleConfig) -> ExtractionResult {
    let meta = PageMeta {
        description: rules.description.resolve(doc),
        keywords: rules
            .extended_meta
            .then(|| rules.keywords.resolve(doc)),
        author: rules.extended_meta.then(|| rules.author.resolve(doc)),
    };

    ExtractionResult {
        title: rules.title.resolve(doc),
        headings: collect::collect_headings(doc, rules),
        images: collect::collect_images(doc, base, rules),
        links: collect::collect_links(doc, base, rules),
        meta,
    }
}
