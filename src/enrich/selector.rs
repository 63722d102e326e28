use chrono::{DateTime, Utc};

use super::observer::{EnrichmentObserver, SkipReason};
use crate::feed::Item;

/// Which items of a feed are eligible for enrichment in one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionWindow {
    /// Items timestamped strictly before this are excluded
    pub from: DateTime<Utc>,
    /// Maximum number of items to enrich
    pub cap: usize,
}

impl SelectionWindow {
    pub fn new(from: DateTime<Utc>, cap: usize) -> Self {
        Self { from, cap }
    }
}

/// The time an item is judged by: `updated` if set, else `published`.
pub fn item_timestamp(item: &Item) -> Option<DateTime<Utc>> {
    item.updated.or(item.published)
}

/// Decides whether a single item may be enriched, ignoring the cap.
pub fn check_eligible(item: &Item, from: DateTime<Utc>) -> Result<DateTime<Utc>, SkipReason> {
    if item.has_content() {
        return Err(SkipReason::HasContent);
    }
    let timestamp = item_timestamp(item).ok_or(SkipReason::NoTimestamp)?;
    if timestamp < from {
        return Err(SkipReason::TooOld(timestamp));
    }
    Ok(timestamp)
}

/// Picks, in source order, the first `window.cap` items that have no
/// content and a timestamp not earlier than `window.from`.
///
/// Skipped items do not count against the cap. Scanning stops as soon as the
/// cap is reached, so later items are neither reported nor touched. Items
/// are not modified here; the mutable borrows are handed on to the
/// coordinator, which writes each selected item's content.
pub fn select<'a>(
    items: &'a mut [Item],
    window: &SelectionWindow,
    observer: &dyn EnrichmentObserver,
) -> Vec<&'a mut Item> {
    let total = items.len();
    let mut selected = Vec::with_capacity(window.cap.min(total));

    for item in items.iter_mut() {
        if selected.len() >= window.cap {
            observer.cap_reached(window.cap, total);
            break;
        }

        match check_eligible(item, window.from) {
            Ok(_) => selected.push(item),
            Err(reason) => observer.item_skipped(item, reason),
        }
    }

    selected
}
