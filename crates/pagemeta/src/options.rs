// ABOUTME: Configuration options for the extraction client and the fluent ClientBuilder.
// ABOUTME: Covers fetch timeout, client identity, extra headers, a custom Fetcher, and the rule configuration.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::client::Client;
use crate::extractors::rules::RuleConfig;
use crate::resource::{Fetcher, BROWSER_USER_AGENT};

/// Default ceiling for the fetch stage.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Output format for rendered results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "markdown",
        };
        write!(f, "{}", s)
    }
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => OutputFormat::Markdown,
            _ => OutputFormat::Json,
        }
    }
}

/// Configuration options for the extraction client.
#[derive(Clone)]
pub struct Options {
    pub timeout: Duration,
    pub user_agent: String,
    pub headers: HashMap<String, String>,
    pub http_client: Option<reqwest::Client>,
    /// Replaces the HTTP fetcher entirely when set.
    pub fetcher: Option<Arc<dyn Fetcher>>,
    pub rules: RuleConfig,
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("headers", &self.headers)
            .field("http_client", &self.http_client.is_some())
            .field("fetcher", &self.fetcher.is_some())
            .field("rules", &self.rules)
            .finish()
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: BROWSER_USER_AGENT.to_string(),
            headers: HashMap::new(),
            http_client: None,
            fetcher: None,
            rules: RuleConfig::default(),
        }
    }
}

/// Builder for constructing Client instances with custom configuration.
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    opts: Options,
}

impl ClientBuilder {
    /// Create a new ClientBuilder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fetch timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Use a custom HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Use a custom fetch stage instead of HTTP.
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.opts.fetcher = Some(fetcher);
        self
    }

    /// Set the extraction rule configuration.
    pub fn rules(mut self, rules: RuleConfig) -> Self {
        self.opts.rules = rules;
        self
    }

    /// Build the Client with the configured options.
    pub fn build(self) -> Client {
        Client::new(self.opts)
    }
}
