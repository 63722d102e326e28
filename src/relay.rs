//! The per-request pipeline: fetch the feed, select items, enrich them,
//! and serialize the result in the source format.

use std::sync::Arc;

use thiserror::Error;
use url::Url;

use crate::enrich::{select, Coordinator, EnrichmentSummary, SelectionWindow};
use crate::feed::{emit, EmitError, Feed, FeedFormat, FeedSource, FetchError};

#[derive(Debug, Error)]
pub enum RelayError {
    /// The source feed could not be downloaded or parsed
    #[error("Can't fetch the feed: {0}")]
    Fetch(#[from] FetchError),
    /// The enriched feed could not be serialized
    #[error("Can't serialize the feed: {0}")]
    Emit(#[from] EmitError),
}

/// A serialized, enriched feed ready to be sent back.
#[derive(Debug)]
pub struct RelayOutput {
    pub format: FeedFormat,
    pub body: Vec<u8>,
    pub summary: EnrichmentSummary,
}

pub struct Relay {
    source: Arc<dyn FeedSource>,
    coordinator: Coordinator,
    title_suffix: String,
}

impl Relay {
    pub fn new(source: Arc<dyn FeedSource>, coordinator: Coordinator) -> Self {
        Self {
            source,
            coordinator,
            title_suffix: String::new(),
        }
    }

    /// Text appended to the relayed feed's title; empty leaves it untouched.
    pub fn with_title_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.title_suffix = suffix.into();
        self
    }

    /// Runs the whole pipeline for one feed.
    ///
    /// Only a feed fetch/parse failure or a serialization failure aborts the
    /// run; items that fail to enrich keep their original content.
    pub async fn run(&self, url: &Url, window: &SelectionWindow) -> Result<RelayOutput, RelayError> {
        let mut feed = self.source.fetch_and_parse(url).await?;
        tracing::info!(
            feed_url = %url,
            feed_title = %feed.title,
            format = %feed.format,
            items = feed.items.len(),
            "Feed downloaded"
        );

        let summary = {
            let observer = self.coordinator.enricher().observer();
            let selected = select(&mut feed.items, window, observer);
            self.coordinator.enrich_all(selected).await
        };
        tracing::info!(
            feed_url = %url,
            from_time = %window.from,
            items_cap = window.cap,
            selected = summary.selected,
            enriched = summary.enriched,
            failed = summary.failed,
            "Feed items enriched"
        );

        self.rename(&mut feed);

        let body = emit(&feed)?;
        Ok(RelayOutput {
            format: feed.format,
            body,
            summary,
        })
    }

    fn rename(&self, feed: &mut Feed) {
        if self.title_suffix.is_empty() {
            return;
        }
        feed.title = if feed.title.is_empty() {
            self.title_suffix.clone()
        } else {
            format!("{} {}", feed.title, self.title_suffix)
        };
    }
}
