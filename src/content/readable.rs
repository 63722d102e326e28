use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use super::{ContentError, ContentExtractor};
use crate::util::{read_limited_bytes, validate_url, BodyError, UserAgentPool};

const MAX_PAGE_SIZE: usize = 5 * 1024 * 1024; // 5MB

/// [`ContentExtractor`] that downloads the article page and runs the
/// `readability` algorithm over it.
///
/// Each request carries a User-Agent drawn from the shared pool. Article
/// links are held to the same SSRF policy as feed targets unless
/// [`allow_private_hosts`](Self::allow_private_hosts) is set.
pub struct ReadabilityExtractor {
    client: reqwest::Client,
    user_agents: Arc<UserAgentPool>,
    allow_private_hosts: bool,
}

impl ReadabilityExtractor {
    pub fn new(client: reqwest::Client, user_agents: Arc<UserAgentPool>) -> Self {
        Self {
            client,
            user_agents,
            allow_private_hosts: false,
        }
    }

    /// Skips the localhost/private-range check on article links.
    pub fn allow_private_hosts(mut self, allow: bool) -> Self {
        self.allow_private_hosts = allow;
        self
    }

    fn parse_link(&self, page_url: &str) -> Result<Url, ContentError> {
        if self.allow_private_hosts {
            let url = Url::parse(page_url).map_err(|e| ContentError::InvalidUrl(e.to_string()))?;
            return match url.scheme() {
                "http" | "https" => Ok(url),
                other => Err(ContentError::InvalidUrl(format!("unsupported scheme {}", other))),
            };
        }
        validate_url(page_url).map_err(|e| ContentError::InvalidUrl(e.to_string()))
    }

    async fn fetch_and_extract(&self, url: Url) -> Result<String, ContentError> {
        let response = self
            .client
            .get(url.as_str())
            .header(reqwest::header::USER_AGENT, self.user_agents.pick())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ContentError::HttpStatus(response.status().as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();

        // Missing Content-Type is given the benefit of the doubt
        if !content_type.is_empty() && !content_type.contains("html") {
            return Err(ContentError::NotHtml(content_type));
        }

        let bytes = read_limited_bytes(response, MAX_PAGE_SIZE)
            .await
            .map_err(|e| match e {
                BodyError::Network(e) => ContentError::Network(e),
                BodyError::TooLarge(limit) => ContentError::ResponseTooLarge(limit),
                BodyError::Incomplete { expected, received } => {
                    ContentError::IncompleteResponse { expected, received }
                }
            })?;

        // DOM parsing and scoring are CPU bound
        let content = tokio::task::spawn_blocking(move || extract_from_html(&bytes, &url))
            .await
            .map_err(|e| ContentError::Extraction(e.to_string()))??;

        Ok(content)
    }
}

#[async_trait]
impl ContentExtractor for ReadabilityExtractor {
    async fn extract_readable(
        &self,
        page_url: &str,
        timeout: Duration,
    ) -> Result<String, ContentError> {
        let url = self.parse_link(page_url)?;

        tokio::time::timeout(timeout, self.fetch_and_extract(url))
            .await
            .map_err(|_| ContentError::Timeout(timeout))?
    }
}

/// Runs readability over an HTML document and returns the article body as HTML.
fn extract_from_html(html: &[u8], url: &Url) -> Result<String, ContentError> {
    let mut reader = Cursor::new(html);
    let product = readability::extractor::extract(&mut reader, url)
        .map_err(|e| ContentError::Extraction(e.to_string()))?;

    if product.text.trim().is_empty() {
        return Err(ContentError::Empty);
    }

    Ok(product.content)
}
