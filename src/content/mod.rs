//! Readable article extraction.
//!
//! [`ContentExtractor`] is the seam the enricher calls through; the
//! production implementation is [`ReadabilityExtractor`], which downloads the
//! page itself and runs a readability pass over the HTML.

mod readable;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use readable::ReadabilityExtractor;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Item has no link to fetch")]
    MissingLink,
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Not an HTML document: {0}")]
    NotHtml(String),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
    #[error("Extraction failed: {0}")]
    Extraction(String),
    #[error("No readable content found")]
    Empty,
}

/// Fetches a page and extracts its main readable content as HTML.
///
/// Implementations must return within `timeout`.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    async fn extract_readable(&self, page_url: &str, timeout: Duration)
        -> Result<String, ContentError>;
}
