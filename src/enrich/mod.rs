//! Selection and enrichment of feed items.
//!
//! This is the core of the relay:
//!
//! - [`selector`] - which items get enriched (recency window + cap, source order)
//! - [`enricher`] - one item: fetch, extract, overwrite on success, swallow failure
//! - [`coordinator`] - all selected items concurrently, behind a fixed-size gate, joined
//! - [`observer`] - the event sink all three report to
//!
//! # Example
//!
//! ```ignore
//! let selected = select(&mut feed.items, &window, coordinator.enricher().observer());
//! let summary = coordinator.enrich_all(selected).await;
//! ```

pub mod coordinator;
pub mod enricher;
pub mod observer;
pub mod selector;

pub use coordinator::{Coordinator, EnrichmentSummary};
pub use enricher::{Enricher, EnrichmentOutcome};
pub use observer::{EnrichmentObserver, SkipReason, TracingObserver};
pub use selector::{check_eligible, item_timestamp, select, SelectionWindow};
