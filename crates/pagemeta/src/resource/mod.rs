// ABOUTME: Resource fetching for the extraction pipeline: the Fetcher seam and its reqwest implementation.
// ABOUTME: Handles browser-like request headers, status checks, content-length limits, and charset decoding.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT};
use url::Url;

use crate::error::{ErrorCode, ExtractError};
use crate::options::Options;

/// Maximum allowed content length (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// Desktop Chrome identity sent by default to get past naive bot filters.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// A successfully retrieved document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    /// The URL after redirects; relative references resolve against this.
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: String,
}

/// Retrieves the raw document for an absolute http(s) URL.
///
/// Implementations make a single attempt and keep no state between calls.
/// Every failure is reported as [`ErrorCode::FetchFailed`].
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, ExtractError>;
}

/// [`Fetcher`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
    headers: HashMap<String, String>,
    timeout: Duration,
}

impl HttpFetcher {
    /// Build a fetcher from client options, reusing `opts.http_client` when set.
    pub fn new(opts: &Options) -> Self {
        let client = opts.http_client.clone().unwrap_or_else(|| {
            reqwest::Client::builder()
                .timeout(opts.timeout)
                .gzip(true)
                .brotli(true)
                .deflate(true)
                .build()
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "falling back to default HTTP client");
                    reqwest::Client::new()
                })
        });

        Self {
            client,
            user_agent: opts.user_agent.clone(),
            headers: opts.headers.clone(),
            timeout: opts.timeout,
        }
    }

    fn fail(url: &Url, msg: impl Into<String>) -> ExtractError {
        ExtractError::fetch_failed(url.as_str(), "Fetch", Some(anyhow::anyhow!(msg.into())))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, ExtractError> {
        let mut request = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, ACCEPT_HTML)
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9");
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Self::fail(url, format!("request timed out after {:?}", self.timeout))
            } else {
                Self::fail(url, format!("request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::fail(url, format!("HTTP status {}", status.as_u16())));
        }

        if let Some(len) = response.content_length() {
            if len as usize > MAX_CONTENT_LENGTH {
                return Err(Self::fail(url, "content too large"));
            }
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_lowercase());

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                Self::fail(url, format!("request timed out after {:?}", self.timeout))
            } else {
                Self::fail(url, format!("failed to read body: {}", e))
            }
        })?;

        if body.len() > MAX_CONTENT_LENGTH {
            return Err(Self::fail(url, "content too large"));
        }

        tracing::debug!(
            status = status.as_u16(),
            bytes = body.len(),
            final_url = %final_url,
            "fetched document"
        );

        Ok(FetchedPage {
            status: status.as_u16(),
            final_url,
            body: decode_body(&body, content_type.as_deref()),
            content_type,
        })
    }
}

/// Returns true for errors a [`Fetcher`] is allowed to produce.
pub(crate) fn is_fetch_error(err: &ExtractError) -> bool {
    err.code == ErrorCode::FetchFailed
}

/// Decode body bytes to a String using charset from content-type header or detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    for part in lower.split(';') {
        let trimmed = part.trim();
        if let Some(charset) = trimmed.strip_prefix("charset=") {
            let charset = charset.trim_matches('"').trim_matches('\'');
            return Some(charset.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn fetcher_with_timeout(timeout: Duration) -> HttpFetcher {
        HttpFetcher::new(&Options {
            timeout,
            ..Default::default()
        })
    }

    fn fetcher() -> HttpFetcher {
        fetcher_with_timeout(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn fetch_ok_utf8() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/test");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body("<p>hello</p>");
        });

        let url = Url::parse(&server.url("/test")).unwrap();
        let page = fetcher().fetch(&url).await.expect("fetch should succeed");
        mock.assert();

        assert_eq!(page.status, 200);
        assert_eq!(page.body, "<p>hello</p>");
        assert_eq!(
            page.content_type.as_deref(),
            Some("text/html; charset=utf-8")
        );
        assert_eq!(page.final_url, url.to_string());
    }

    #[tokio::test]
    async fn fetch_sends_browser_identity() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/ua")
                .header("user-agent", BROWSER_USER_AGENT);
            then.status(200).body("<p>ok</p>");
        });

        let url = Url::parse(&server.url("/ua")).unwrap();
        let result = fetcher().fetch(&url).await;
        mock.assert();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn fetch_sends_custom_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/h").header("x-trace", "abc");
            then.status(200).body("<p>ok</p>");
        });

        let mut headers = HashMap::new();
        headers.insert("x-trace".to_string(), "abc".to_string());
        let fetcher = HttpFetcher::new(&Options {
            headers,
            ..Default::default()
        });

        let url = Url::parse(&server.url("/h")).unwrap();
        let result = fetcher.fetch(&url).await;
        mock.assert();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn fetch_404_is_fetch_failed() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404).body("not found");
        });

        let url = Url::parse(&server.url("/missing")).unwrap();
        let err = fetcher().fetch(&url).await.expect_err("404 should fail");
        mock.assert();

        assert!(err.is_fetch_failed());
        assert!(err.to_string().contains("HTTP status 404"));
    }

    #[tokio::test]
    async fn fetch_500_is_fetch_failed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/boom");
            then.status(500);
        });

        let url = Url::parse(&server.url("/boom")).unwrap();
        let err = fetcher().fetch(&url).await.expect_err("500 should fail");
        assert!(is_fetch_error(&err));
    }

    #[tokio::test]
    async fn fetch_timeout_is_fetch_failed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/slow");
            then.status(200)
                .delay(Duration::from_secs(3))
                .body("<p>late</p>");
        });

        let url = Url::parse(&server.url("/slow")).unwrap();
        let err = fetcher_with_timeout(Duration::from_millis(200))
            .fetch(&url)
            .await
            .expect_err("slow response should time out");
        assert!(err.is_fetch_failed());
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn fetch_connection_refused_is_fetch_failed() {
        // Port 9 (discard) on loopback is essentially never listening.
        let url = Url::parse("http://127.0.0.1:9/").unwrap();
        let err = fetcher().fetch(&url).await.expect_err("should not connect");
        assert!(err.is_fetch_failed());
    }

    #[test]
    fn max_content_length_is_ten_megabytes() {
        assert_eq!(MAX_CONTENT_LENGTH, 10 * 1024 * 1024);
    }

    #[test]
    fn decode_iso_8859_1_with_chardetng() {
        let iso_bytes: &[u8] = &[0x63, 0x61, 0x66, 0xe9];
        assert_eq!(decode_body(iso_bytes, None), "caf\u{e9}");
    }

    #[test]
    fn decode_uses_declared_charset() {
        let latin1: &[u8] = &[0x6e, 0x61, 0xef, 0x76, 0x65];
        assert_eq!(
            decode_body(latin1, Some("text/html; charset=iso-8859-1")),
            "na\u{ef}ve"
        );
    }

    #[test]
    fn extract_charset_variants() {
        assert_eq!(
            extract_charset("text/html; charset=utf-8"),
            Some("utf-8".to_string())
        );
        assert_eq!(
            extract_charset("text/html; charset=\"ISO-8859-1\""),
            Some("iso-8859-1".to_string())
        );
        assert_eq!(extract_charset("text/html"), None);
    }
}
