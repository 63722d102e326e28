use std::sync::Arc;
use std::time::Duration;

use super::observer::EnrichmentObserver;
use crate::content::{ContentError, ContentExtractor};
use crate::feed::Item;

/// Result of enriching one item. Failures carry no error; it has already
/// been reported to the observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    Enriched { content_len: usize },
    Failed,
}

/// Replaces a single item's content with the readable text of its link.
#[derive(Clone)]
pub struct Enricher {
    extractor: Arc<dyn ContentExtractor>,
    observer: Arc<dyn EnrichmentObserver>,
    fetch_timeout: Duration,
}

impl Enricher {
    pub fn new(
        extractor: Arc<dyn ContentExtractor>,
        observer: Arc<dyn EnrichmentObserver>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            extractor,
            observer,
            fetch_timeout,
        }
    }

    pub fn observer(&self) -> &dyn EnrichmentObserver {
        self.observer.as_ref()
    }

    /// Fetches and extracts the item's page, overwriting `item.content` on
    /// success. On any failure the item is left exactly as it was and the
    /// error goes to the observer only.
    pub async fn enrich(&self, item: &mut Item) -> EnrichmentOutcome {
        self.observer.enrichment_started(item);

        match self.extract(item).await {
            Ok(content) => {
                let content_len = content.len();
                item.content = content;
                self.observer.enrichment_succeeded(item, content_len);
                EnrichmentOutcome::Enriched { content_len }
            }
            Err(e) => {
                self.observer.enrichment_failed(item, &e);
                EnrichmentOutcome::Failed
            }
        }
    }

    async fn extract(&self, item: &Item) -> Result<String, ContentError> {
        if item.link.trim().is_empty() {
            return Err(ContentError::MissingLink);
        }

        let content = self
            .extractor
            .extract_readable(&item.link, self.fetch_timeout)
            .await?;

        if content.trim().is_empty() {
            return Err(ContentError::Empty);
        }
        Ok(content)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Extractor returning canned results keyed by link; unknown links fail.
    #[derive(Default)]
    pub struct StubExtractor {
        pages: HashMap<String, String>,
        delay: Duration,
        calls: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
    }

    impl StubExtractor {
        pub fn with_page(mut self, link: &str, content: &str) -> Self {
            self.pages.insert(link.to_string(), content.to_string());
            self
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn peak_in_flight(&self) -> usize {
            self.peak_in_flight.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ContentExtractor for StubExtractor {
        async fn extract_readable(
            &self,
            page_url: &str,
            _timeout: Duration,
        ) -> Result<String, ContentError> {
            self.calls.lock().unwrap().push(page_url.to_string());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.pages
                .get(page_url)
                .cloned()
                .ok_or(ContentError::HttpStatus(404))
        }
    }
}
