// ABOUTME: Request and result records of the extraction pipeline.
// ABOUTME: ExtractionResult is the serialized output; includes a markdown rendering for the CLI.

use serde::{Deserialize, Serialize};

/// Input to [`crate::Client::extract`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ExtractionRequest {
    /// Absolute http(s) URL. A missing field deserializes as empty and is rejected.
    #[serde(default)]
    pub url: String,
}

impl ExtractionRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Page metadata with sentinel values for absent fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PageMeta {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// Structured data extracted from one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ExtractionResult {
    pub title: String,
    pub headings: Vec<String>,
    /// Absolute http(s) URLs.
    pub images: Vec<String>,
    /// Absolute http(s) URLs.
    pub links: Vec<String>,
    pub meta: PageMeta,
}

impl ExtractionResult {
    /// Format the result as a markdown document.
    pub fn format_markdown(&self) -> String {
        let mut parts = vec![format!("# {}", self.title)];

        let mut meta = vec![format!("> {}", self.meta.description)];
        if let Some(ref keywords) = self.meta.keywords {
            meta.push(format!("Keywords: {}", keywords));
        }
        if let Some(ref author) = self.meta.author {
            meta.push(format!("Author: {}", author));
        }
        parts.push(meta.join("\n\n"));

        if !self.headings.is_empty() {
            let items: Vec<String> = self.headings.iter().map(|h| format!("- {}", h)).collect();
            parts.push(format!("## Headings\n\n{}", items.join("\n")));
        }

        if !self.images.is_empty() {
            let items: Vec<String> = self
                .images
                .iter()
                .map(|src| format!("- ![]({})", src))
                .collect();
            parts.push(format!("## Images\n\n{}", items.join("\n")));
        }

        if !self.links.is_empty() {
            let items: Vec<String> = self
                .links
                .iter()
                .map(|href| format!("- <{}>", href))
                .collect();
            parts.push(format!("## Links\n\n{}", items.join("\n")));
        }

        parts.join("\n\n")
    }
}
