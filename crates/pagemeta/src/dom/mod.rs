// ABOUTME: HTML parsing stage: turns a fetched body into a queryable document tree.
// ABOUTME: Rejects non-HTML payloads and exposes select/text/attribute lookups over scraper.

//! Document tree handling.
//!
//! Parsing goes through html5ever (via `scraper`), which recovers from
//! unclosed tags and other malformed markup the way browsers do. The only
//! payloads refused are ones that are not HTML at all: a non-HTML
//! `Content-Type`, an empty body, or text without any markup.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};

use crate::error::ExtractError;
use crate::extractors::compiled::get_or_compile;

static MARKUP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[A-Za-z!/?]").unwrap());

const HTML_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// A parsed HTML document.
pub struct Document {
    html: Html,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document").finish_non_exhaustive()
    }
}

impl Document {
    /// Parse `body` as HTML.
    ///
    /// `content_type` is the response header value, if any; `url` is only used
    /// to label errors.
    pub fn parse(body: &str, content_type: Option<&str>, url: &str) -> Result<Self, ExtractError> {
        if let Some(ct) = content_type {
            let mime = ct.split(';').next().unwrap_or("").trim().to_lowercase();
            if !mime.is_empty() && !HTML_CONTENT_TYPES.contains(&mime.as_str()) {
                return Err(ExtractError::parse_failed(
                    url,
                    "Parse",
                    Some(anyhow::anyhow!("unsupported content type: {}", mime)),
                ));
            }
        }

        let trimmed = body.trim_start_matches('\u{feff}').trim();
        if trimmed.is_empty() {
            return Err(ExtractError::parse_failed(
                url,
                "Parse",
                Some(anyhow::anyhow!("empty document")),
            ));
        }

        if !MARKUP_RE.is_match(trimmed) {
            return Err(ExtractError::parse_failed(
                url,
                "Parse",
                Some(anyhow::anyhow!("no HTML markup found")),
            ));
        }

        Ok(Self {
            html: Html::parse_document(body),
        })
    }

    /// First element matching `css`, in document order.
    pub fn select_first(&self, css: &str) -> Option<ElementRef<'_>> {
        let selector = get_or_compile(css)?;
        self.html.select(&selector).next()
    }

    /// All elements matching `css`, in document order. Invalid selectors match nothing.
    pub fn select_all(&self, css: &str) -> Vec<ElementRef<'_>> {
        match get_or_compile(css) {
            Some(selector) => self.html.select(&selector).collect(),
            None => Vec::new(),
        }
    }
}

/// Descendant text of `el` with whitespace runs collapsed and trimmed.
pub fn text_of(el: &ElementRef<'_>) -> String {
    normalize_whitespace(&el.text().collect::<String>())
}

/// Trimmed attribute value, or `None` when missing or blank.
pub fn attr_of(el: &ElementRef<'_>, name: &str) -> Option<String> {
    el.value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Collapses runs of whitespace into single spaces.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
