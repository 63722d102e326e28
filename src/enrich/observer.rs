use chrono::{DateTime, Utc};

use crate::content::ContentError;
use crate::feed::Item;

/// Why the selector passed over an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The source already supplied a body
    HasContent,
    /// Neither an updated nor a published time, so recency can't be judged
    NoTimestamp,
    /// Timestamp is strictly before the window's lower bound
    TooOld(DateTime<Utc>),
}

/// Receives the events of the selection and enrichment stages.
///
/// Passed explicitly into the selector, enricher and coordinator instead of
/// logging through a global handle. Every method has an empty default so
/// implementations only override what they care about. Implementations are
/// shared by all concurrent enrichment units and must be `Send + Sync`.
pub trait EnrichmentObserver: Send + Sync {
    fn item_skipped(&self, _item: &Item, _reason: SkipReason) {}

    fn cap_reached(&self, _cap: usize, _total_items: usize) {}

    fn enrichment_started(&self, _item: &Item) {}

    fn enrichment_succeeded(&self, _item: &Item, _content_len: usize) {}

    fn enrichment_failed(&self, _item: &Item, _error: &ContentError) {}
}

/// Production observer: forwards every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl EnrichmentObserver for TracingObserver {
    fn item_skipped(&self, item: &Item, reason: SkipReason) {
        match reason {
            SkipReason::HasContent => {
                tracing::debug!(item = %item.title, "Item has content, skipping");
            }
            SkipReason::NoTimestamp => {
                tracing::debug!(item = %item.title, "Item has no time set, skipping");
            }
            SkipReason::TooOld(item_time) => {
                tracing::debug!(
                    item = %item.title,
                    item_time = %item_time,
                    "Item is outside the time window, skipping"
                );
            }
        }
    }

    fn cap_reached(&self, cap: usize, total_items: usize) {
        tracing::info!(items_cap = cap, feed_items_count = total_items, "Items cap reached");
    }

    fn enrichment_started(&self, item: &Item) {
        tracing::debug!(item = %item.title, item_link = %item.link, "Fetching content for the item");
    }

    fn enrichment_succeeded(&self, item: &Item, content_len: usize) {
        tracing::debug!(
            item = %item.title,
            item_link = %item.link,
            content_len = content_len,
            "Item content extracted"
        );
    }

    fn enrichment_failed(&self, item: &Item, error: &ContentError) {
        tracing::warn!(
            item = %item.title,
            item_link = %item.link,
            error = %error,
            "Failed to extract content for the item"
        );
    }
}
