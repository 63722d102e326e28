use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use super::model::Feed;
use super::parser::parse_feed;
use crate::util::{read_limited_bytes, BodyError, UserAgentPool};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while downloading and parsing a source feed.
///
/// Network-level failures and unparseable content are kept apart so callers
/// and logs can tell them apart, although the relay aborts on any of them.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the fetch timeout
    #[error("Request timed out")]
    Timeout,
    /// Body could not be parsed as RSS, Atom or JSON Feed
    #[error("Parse error: {0}")]
    Parse(String),
    /// Response body exceeded the size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
}

impl From<BodyError> for FetchError {
    fn from(err: BodyError) -> Self {
        match err {
            BodyError::Network(e) => FetchError::Network(e),
            BodyError::TooLarge(_) => FetchError::ResponseTooLarge,
            BodyError::Incomplete { expected, received } => {
                FetchError::IncompleteResponse { expected, received }
            }
        }
    }
}

/// Downloads a feed and parses it into the relay's [`Feed`] model.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_and_parse(&self, url: &Url) -> Result<Feed, FetchError>;
}

/// [`FeedSource`] backed by a shared `reqwest` client.
pub struct HttpFeedSource {
    client: reqwest::Client,
    user_agents: Arc<UserAgentPool>,
    timeout: Duration,
}

impl HttpFeedSource {
    pub fn new(client: reqwest::Client, user_agents: Arc<UserAgentPool>) -> Self {
        Self {
            client,
            user_agents,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn download(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let request = self
            .client
            .get(url.as_str())
            .header(reqwest::header::USER_AGENT, self.user_agents.pick());

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        Ok(read_limited_bytes(response, MAX_FEED_SIZE).await?)
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch_and_parse(&self, url: &Url) -> Result<Feed, FetchError> {
        // The timeout covers the body read, not just the response headers
        let bytes = tokio::time::timeout(self.timeout, self.download(url))
            .await
            .map_err(|_| FetchError::Timeout)??;

        let feed = parse_feed(&bytes).map_err(|e| FetchError::Parse(e.to_string()))?;

        tracing::debug!(
            feed_url = %url,
            format = %feed.format,
            items = feed.items.len(),
            bytes = bytes.len(),
            "Feed downloaded and parsed"
        );

        Ok(feed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FeedFormat;
    use crate::util::USER_AGENTS;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    const VALID_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <title>Test</title>
    <item><guid>1</guid><title>Test</title></item>
</channel></rss>"#;

    fn source() -> HttpFeedSource {
        HttpFeedSource::new(reqwest::Client::new(), Arc::new(UserAgentPool::seeded(1)))
    }

    fn feed_url(server: &MockServer) -> Url {
        Url::parse(&format!("{}/feed", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(VALID_RSS, "application/xml"),
            )
            .mount(&mock_server)
            .await;

        let feed = source()
            .fetch_and_parse(&feed_url(&mock_server))
            .await
            .unwrap();
        assert_eq!(feed.format, FeedFormat::Rss);
        assert_eq!(feed.items.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_sends_pooled_user_agent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RSS))
            .expect(1)
            .mount(&mock_server)
            .await;

        source()
            .fetch_and_parse(&feed_url(&mock_server))
            .await
            .unwrap();

        let requests: Vec<Request> = mock_server.received_requests().await.unwrap();
        let ua = requests[0].headers.get("user-agent").unwrap().to_str().unwrap();
        assert!(USER_AGENTS.contains(&ua));
    }

    #[tokio::test]
    async fn test_fetch_404_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let result = source().fetch_and_parse(&feed_url(&mock_server)).await;
        match result {
            Err(FetchError::HttpStatus(404)) => {}
            other => panic!("Expected HttpStatus(404), got {:?}", other.map(|f| f.title)),
        }
    }

    #[tokio::test]
    async fn test_fetch_500_is_not_retried() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = source().fetch_and_parse(&feed_url(&mock_server)).await;
        assert!(matches!(result, Err(FetchError::HttpStatus(500))));
    }

    #[tokio::test]
    async fn test_malformed_feed_parse_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<not valid xml"))
            .mount(&mock_server)
            .await;

        let result = source().fetch_and_parse(&feed_url(&mock_server)).await;
        assert!(matches!(result, Err(FetchError::Parse(_))));
    }

    #[tokio::test]
    async fn test_slow_feed_times_out() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_RSS)
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&mock_server)
            .await;

        let result = source()
            .with_timeout(Duration::from_millis(100))
            .fetch_and_parse(&feed_url(&mock_server))
            .await;
        assert!(matches!(result, Err(FetchError::Timeout)));
    }

    #[tokio::test]
    async fn test_empty_feed_success() {
        let empty_rss = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>Empty</title></channel></rss>"#;

        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(empty_rss))
            .mount(&mock_server)
            .await;

        let feed = source()
            .fetch_and_parse(&feed_url(&mock_server))
            .await
            .unwrap();
        assert!(feed.items.is_empty());
    }
}
