// ABOUTME: Candidate providers for single-valued fields: selector specs evaluated in order.
// ABOUTME: A FieldRule walks its providers until one yields a non-empty value, else returns its sentinel.

//! Selector-based field extraction.
//!
//! Key behaviors:
//! - Providers are tried in order; the first one yielding a non-empty value wins.
//! - Each provider reads only its first matching element.
//! - Text extraction collapses whitespace; attribute extraction trims.
//! - Empty values count as absent and fall through.
//! - Invalid selectors match nothing.

use serde::{Deserialize, Serialize};

use crate::dom::{attr_of, text_of, Document};

/// One candidate provider.
///
/// Serialized untagged: `"title"` for element text, `["meta[property='og:title']", "content"]`
/// for an attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorSpec {
    /// Text content of matching elements.
    Css(String),
    /// `[selector, attribute]`: attribute value of matching elements.
    CssAttr(Vec<String>),
}

impl SelectorSpec {
    /// Text provider for `css`.
    pub fn text(css: impl Into<String>) -> Self {
        SelectorSpec::Css(css.into())
    }

    /// Attribute provider for `css` / `attr`.
    pub fn attr(css: impl Into<String>, attr: impl Into<String>) -> Self {
        SelectorSpec::CssAttr(vec![css.into(), attr.into()])
    }

    /// Shorthand for the `content` attribute of a meta tag.
    pub fn meta(css: impl Into<String>) -> Self {
        Self::attr(css, "content")
    }

    /// Value of the first element matching this provider, if non-empty.
    pub fn first_value(&self, doc: &Document) -> Option<String> {
        match self {
            SelectorSpec::Css(css) => doc
                .select_first(css)
                .map(|el| text_of(&el))
                .filter(|t| !t.is_empty()),
            SelectorSpec::CssAttr(parts) => match parts.as_slice() {
                [css, attr, ..] => doc.select_first(css).and_then(|el| attr_of(&el, attr)),
                [css] => SelectorSpec::Css(css.clone()).first_value(doc),
                [] => None,
            },
        }
    }
}

/// An ordered fallback chain ending in a sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FieldRule {
    /// Providers to try in order.
    #[serde(default)]
    pub selectors: Vec<SelectorSpec>,
    /// Returned when no provider yields a value.
    #[serde(default)]
    pub fallback: String,
}

impl FieldRule {
    pub fn new(selectors: Vec<SelectorSpec>, fallback: impl Into<String>) -> Self {
        Self {
            selectors,
            fallback: fallback.into(),
        }
    }

    /// The first provider value, if any provider matched.
    pub fn probe(&self, doc: &Document) -> Option<String> {
        self.selectors.iter().find_map(|spec| spec.first_value(doc))
    }

    /// The first provider value, or the sentinel.
    pub fn resolve(&self, doc: &Document) -> String {
        self.probe(doc).unwrap_or_else(|| self.fallback.clone())
    }

    /// Every selector string this rule queries.
    pub(crate) fn selector_strings(&self) -> impl Iterator<Item = &str> {
        self.selectors.iter().filter_map(|spec| match spec {
            SelectorSpec::Css(css) => Some(css.as_str()),
            SelectorSpec::CssAttr(parts) => parts.first().map(String::as_str),
        })
    }
}
