// ABOUTME: The Client orchestrates the pipeline: validate the URL, fetch, parse, then apply the extraction rules.
// ABOUTME: Provides async extract() for URLs and extract_html() for caller-supplied documents.

use std::sync::Arc;

use tracing::{debug, info, warn};
use url::Url;

use crate::dom::Document;
use crate::error::ExtractError;
use crate::extractors::compiled::precompile_selectors;
use crate::extractors::extract_page;
use crate::options::{ClientBuilder, Options};
use crate::resource::{is_fetch_error, Fetcher, HttpFetcher};
use crate::result::{ExtractionRequest, ExtractionResult};

/// Checks that `raw` is an absolute http(s) URL with a host.
pub fn validate_url(raw: &str, op: &str) -> Result<Url, ExtractError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::invalid_request(
            raw,
            op,
            Some(anyhow::anyhow!("URL is required")),
        ));
    }

    let url = Url::parse(trimmed).map_err(|e| {
        ExtractError::invalid_request(raw, op, Some(anyhow::anyhow!("malformed URL: {}", e)))
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ExtractError::invalid_request(
                raw,
                op,
                Some(anyhow::anyhow!("unsupported scheme: {}", other)),
            ))
        }
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ExtractError::invalid_request(
            raw,
            op,
            Some(anyhow::anyhow!("URL has no host")),
        ));
    }

    Ok(url)
}

/// The extraction pipeline.
///
/// Cheap to clone; clones share the underlying fetcher. Holds no per-request
/// state, so one client can serve concurrent requests.
#[derive(Clone)]
pub struct Client {
    opts: Options,
    fetcher: Arc<dyn Fetcher>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").field("opts", &self.opts).finish()
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl Client {
    /// Create a new ClientBuilder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a new Client with the given options.
    pub fn new(opts: Options) -> Self {
        let fetcher = opts
            .fetcher
            .clone()
            .unwrap_or_else(|| Arc::new(HttpFetcher::new(&opts)));
        precompile_selectors(opts.rules.selectors());
        Self { opts, fetcher }
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Run the full pipeline for `request`.
    ///
    /// Returns the complete result or exactly one error; no retries are made.
    #[tracing::instrument(name = "extract", skip_all, fields(url = %request.url))]
    pub async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionResult, ExtractError> {
        let url = validate_url(&request.url, "Extract").inspect_err(|e| {
            warn!(error = %e, "rejected request");
        })?;
        info!("extracting");

        let page = match tokio::time::timeout(self.opts.timeout, self.fetcher.fetch(&url)).await {
            Ok(Ok(page)) => page,
            Ok(Err(e)) => {
                let err = if is_fetch_error(&e) {
                    e
                } else {
                    ExtractError::fetch_failed(url.as_str(), "Fetch", Some(anyhow::Error::new(e)))
                };
                warn!(error = %err, "fetch failed");
                return Err(err);
            }
            Err(_) => {
                let err = ExtractError::fetch_failed(
                    url.as_str(),
                    "Fetch",
                    Some(anyhow::anyhow!(
                        "request timed out after {:?}",
                        self.opts.timeout
                    )),
                );
                warn!(error = %err, "fetch failed");
                return Err(err);
            }
        };

        // Redirects change the base for relative references.
        let base = Url::parse(&page.final_url).unwrap_or(url);
        self.extract_document(&page.body, page.content_type.as_deref(), &base)
    }

    /// Run the pipeline for a bare URL string.
    pub async fn extract_url(&self, url: &str) -> Result<ExtractionResult, ExtractError> {
        self.extract(&ExtractionRequest::new(url)).await
    }

    /// Parse and extract caller-supplied HTML, resolving references against `url`.
    ///
    /// Never touches the network.
    pub fn extract_html(&self, html: &str, url: &str) -> Result<ExtractionResult, ExtractError> {
        let base = validate_url(url, "ExtractHTML")?;
        self.extract_document(html, None, &base)
    }

    fn extract_document(
        &self,
        body: &str,
        content_type: Option<&str>,
        base: &Url,
    ) -> Result<ExtractionResult, ExtractError> {
        let doc = Document::parse(body, content_type, base.as_str()).inspect_err(|e| {
            warn!(error = %e, "parse failed");
        })?;
        let result = extract_page(&doc, base, &self.opts.rules);
        debug!(
            headings = result.headings.len(),
            images = result.images.len(),
            links = result.links.len(),
            "extracted"
        );
        Ok(result)
    }
}
