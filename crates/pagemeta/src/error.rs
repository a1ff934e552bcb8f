// ABOUTME: Error types for the extraction pipeline including ErrorCode enum and ExtractError struct.
// ABOUTME: Provides the three terminal failure kinds with convenience constructors and boolean helpers.

use std::fmt;

/// Error codes representing the categories of pipeline failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Missing or syntactically invalid URL, detected before any I/O.
    InvalidRequest,
    /// Network error, non-success HTTP status, or timeout during retrieval.
    FetchFailed,
    /// The fetched body could not be turned into an HTML document tree.
    ParseFailed,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidRequest => "invalid request",
            ErrorCode::FetchFailed => "fetch failed",
            ErrorCode::ParseFailed => "parse failed",
        };
        write!(f, "{}", s)
    }
}

/// The error type returned by every pipeline entry point.
#[derive(Debug, thiserror::Error)]
pub struct ExtractError {
    pub code: ErrorCode,
    pub url: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)?;
        if !self.url.is_empty() {
            write!(f, " for {}", self.url)?;
        }
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl ExtractError {
    fn new(
        code: ErrorCode,
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Create an InvalidRequest error.
    pub fn invalid_request(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::InvalidRequest, url, op, source)
    }

    /// Create a FetchFailed error.
    pub fn fetch_failed(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::FetchFailed, url, op, source)
    }

    /// Create a ParseFailed error.
    pub fn parse_failed(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::ParseFailed, url, op, source)
    }

    /// Returns true if this is an InvalidRequest error.
    pub fn is_invalid_request(&self) -> bool {
        self.code == ErrorCode::InvalidRequest
    }

    /// Returns true if this is a FetchFailed error.
    pub fn is_fetch_failed(&self) -> bool {
        self.code == ErrorCode::FetchFailed
    }

    /// Returns true if this is a ParseFailed error.
    pub fn is_parse_failed(&self) -> bool {
        self.code == ErrorCode::ParseFailed
    }
}
