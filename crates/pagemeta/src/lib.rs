// ABOUTME: Main library entry point for the pagemeta page extractor.
// ABOUTME: Re-exports the public API: Client, ClientBuilder, ExtractionResult, ExtractError, RuleConfig, Fetcher.

//! pagemeta - fetch a web page and extract its title, headings, images, links
//! and metadata as a structured record.
//!
//! The pipeline is validate → fetch → parse → extract. Each stage is
//! sequential; the only failures are an invalid request, a failed fetch, or a
//! body that is not HTML. Missing fields never fail a request, they resolve to
//! sentinel values instead.
//!
//! # Example
//!
//! ```no_run
//! use pagemeta::{Client, ExtractError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ExtractError> {
//!     let client = Client::builder().build();
//!     let result = client.extract_url("https://example.com/").await?;
//!     println!("{}", result.format_markdown());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod dom;
pub mod error;
pub mod extractors;
pub mod observability;
pub mod options;
pub mod resource;
pub mod result;
pub mod server;

pub use crate::client::{validate_url, Client};
pub use crate::error::{ErrorCode, ExtractError};
pub use crate::extractors::rules::RuleConfig;
pub use crate::extractors::select::{FieldRule, SelectorSpec};
pub use crate::options::{ClientBuilder, Options, OutputFormat};
pub use crate::resource::{FetchedPage, Fetcher, HttpFetcher};
pub use crate::result::{ExtractionRequest, ExtractionResult, PageMeta};
