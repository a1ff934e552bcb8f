// ABOUTME: Tunable parameters of the extraction rules: heading levels, length filter, caps, and fallback chains.
// ABOUTME: Ships the extended and minimal presets and loads overrides from JSON.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::extractors::select::{FieldRule, SelectorSpec};

pub const NO_TITLE: &str = "No Title";
pub const NO_DESCRIPTION: &str = "No description found";
pub const NOT_FOUND: &str = "Not found";

/// Configuration for the extraction rules.
///
/// Every field has a default, so a JSON file only needs the keys it changes.
/// A cap of `None` (`null`) leaves that list unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Heading levels to collect, e.g. `[1, 2, 3, 4]`. Levels outside 1..=6 are ignored.
    pub heading_levels: Vec<u8>,
    /// Headings shorter than this (in characters) are dropped.
    pub min_heading_len: usize,
    pub max_headings: Option<usize>,
    pub max_images: Option<usize>,
    pub max_links: Option<usize>,
    /// Collect `url(...)` targets from inline `background-image` styles.
    pub background_images: bool,
    /// Collect `og:image` meta content as an image candidate.
    pub og_image: bool,
    /// Surface `keywords` and `author` alongside the description.
    pub extended_meta: bool,
    pub title: FieldRule,
    pub description: FieldRule,
    pub keywords: FieldRule,
    pub author: FieldRule,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self::extended()
    }
}

impl RuleConfig {
    /// h1–h4, three-character minimum, 25/20/20 caps, every image source, full metadata.
    pub fn extended() -> Self {
        Self {
            heading_levels: vec![1, 2, 3, 4],
            min_heading_len: 3,
            max_headings: Some(25),
            max_images: Some(20),
            max_links: Some(20),
            background_images: true,
            og_image: true,
            extended_meta: true,
            title: default_title_rule(),
            description: default_description_rule(),
            keywords: FieldRule::new(vec![SelectorSpec::meta("meta[name='keywords']")], NOT_FOUND),
            author: FieldRule::new(
                vec![
                    SelectorSpec::meta("meta[name='author']"),
                    SelectorSpec::meta("meta[property='article:author']"),
                ],
                NOT_FOUND,
            ),
        }
    }

    /// h1–h2, any non-empty heading, no caps, `img` sources only, description only.
    pub fn minimal() -> Self {
        Self {
            heading_levels: vec![1, 2],
            min_heading_len: 1,
            max_headings: None,
            max_images: None,
            max_links: None,
            background_images: false,
            og_image: false,
            extended_meta: false,
            ..Self::extended()
        }
    }

    /// Look up a preset by name (`extended` or `minimal`).
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "extended" | "default" => Some(Self::extended()),
            "minimal" => Some(Self::minimal()),
            _ => None,
        }
    }

    /// Parse a JSON rule file; missing keys take their `extended()` values.
    pub fn from_json_str(s: &str) -> anyhow::Result<Self> {
        serde_json::from_str(s).context("invalid rule configuration")
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read rule file {}", path.display()))?;
        Self::from_json_str(&raw)
    }

    /// Selector list for the configured heading levels, e.g. `"h1, h2"`.
    pub fn heading_selector(&self) -> Option<String> {
        let tags: Vec<String> = self
            .heading_levels
            .iter()
            .filter(|l| (1..=6).contains(*l))
            .map(|l| format!("h{}", l))
            .collect();
        if tags.is_empty() {
            None
        } else {
            Some(tags.join(", "))
        }
    }

    /// Selector list for image candidate elements.
    pub fn image_selector(&self) -> String {
        let mut parts = vec!["img"];
        if self.background_images {
            parts.push("[style*='background-image']");
        }
        if self.og_image {
            parts.push("meta[property='og:image']");
        }
        parts.join(", ")
    }

    /// Every selector the rules will query, for cache warm-up.
    pub fn selectors(&self) -> Vec<String> {
        let mut all = vec![self.image_selector(), "a".to_string()];
        all.extend(self.heading_selector());
        for rule in [&self.title, &self.description, &self.keywords, &self.author] {
            all.extend(rule.selector_strings().map(str::to_string));
        }
        all
    }
}

fn default_title_rule() -> FieldRule {
    FieldRule::new(
        vec![
            SelectorSpec::text("head title"),
            SelectorSpec::meta("meta[property='og:title']"),
            SelectorSpec::meta("meta[name='twitter:title']"),
        ],
        NO_TITLE,
    )
}

fn default_description_rule() -> FieldRule {
    FieldRule::new(
        vec![
            SelectorSpec::meta("meta[name='description']"),
            SelectorSpec::meta("meta[property='og:description']"),
        ],
        NO_DESCRIPTION,
    )
}
