use std::num::NonZeroUsize;

use futures::stream::{self, StreamExt};

use super::enricher::{Enricher, EnrichmentOutcome};
use crate::feed::Item;

/// Counts reported once every enrichment unit has finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentSummary {
    pub selected: usize,
    pub enriched: usize,
    pub failed: usize,
}

/// Runs the [`Enricher`] over a set of selected items concurrently.
///
/// At most `max_in_flight` fetches run at once, independent of how many items
/// were selected. Each unit borrows only its own item, so units never
/// contend for shared state and completion order has no observable effect.
pub struct Coordinator {
    enricher: Enricher,
    max_in_flight: NonZeroUsize,
}

impl Coordinator {
    pub fn new(enricher: Enricher, max_in_flight: NonZeroUsize) -> Self {
        Self {
            enricher,
            max_in_flight,
        }
    }

    pub fn enricher(&self) -> &Enricher {
        &self.enricher
    }

    /// Enriches every item in `selected` and returns once all of them have
    /// either succeeded or failed. Never fails as a whole.
    ///
    /// Dropping the returned future (e.g. the client went away) drops every
    /// in-flight fetch with it.
    pub async fn enrich_all(&self, selected: Vec<&mut Item>) -> EnrichmentSummary {
        let total = selected.len();
        if total == 0 {
            return EnrichmentSummary::default();
        }

        // Built up front: a closure over `&mut Item` held inside the stream
        // makes this future !Send, and axum handlers need Send.
        let units: Vec<_> = selected
            .into_iter()
            .map(|item| self.enricher.enrich(item))
            .collect();

        let outcomes: Vec<EnrichmentOutcome> = stream::iter(units)
            .buffer_unordered(self.max_in_flight.get())
            .collect()
            .await;

        let enriched = outcomes
            .iter()
            .filter(|o| matches!(o, EnrichmentOutcome::Enriched { .. }))
            .count();

        EnrichmentSummary {
            selected: total,
            enriched,
            failed: total - enriched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::enricher::testing::StubExtractor;
    use crate::enrich::observer::recording::{Event, RecordingObserver};
    use crate::enrich::{select, SelectionWindow};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::time::Duration;

    fn item(id: &str) -> Item {
        Item {
            id: id.to_string(),
            link: format!("https://example.com/{}", id),
            published: Some(Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        }
    }

    fn coordinator(
        extractor: StubExtractor,
        max_in_flight: usize,
    ) -> (Coordinator, Arc<StubExtractor>, Arc<RecordingObserver>) {
        let extractor = Arc::new(extractor);
        let observer = Arc::new(RecordingObserver::default());
        let enricher = Enricher::new(extractor.clone(), observer.clone(), Duration::from_secs(1));
        let coordinator = Coordinator::new(enricher, NonZeroUsize::new(max_in_flight).unwrap());
        (coordinator, extractor, observer)
    }

    #[tokio::test]
    async fn test_partial_failure_does_not_affect_siblings() {
        let (coordinator, _, observer) = coordinator(
            StubExtractor::default()
                .with_page("https://example.com/a", "<p>A</p>")
                .with_page("https://example.com/c", "<p>C</p>"),
            4,
        );
        let mut items = vec![item("a"), item("b"), item("c")];

        let summary = coordinator.enrich_all(items.iter_mut().collect()).await;

        assert_eq!(
            summary,
            EnrichmentSummary {
                selected: 3,
                enriched: 2,
                failed: 1
            }
        );
        assert_eq!(items[0].content, "<p>A</p>");
        assert_eq!(items[1].content, "");
        assert_eq!(items[2].content, "<p>C</p>");
        assert!(observer.events().contains(&Event::Failed("b".into())));
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn test_enrich_all_future_is_send() {
        let (coordinator, _, _) = coordinator(StubExtractor::default(), 2);
        let mut items = vec![item("a")];
        let future = coordinator.enrich_all(items.iter_mut().collect());
        assert_send(&future);
    }

    #[tokio::test]
    async fn test_empty_selection_is_a_no_op() {
        let (coordinator, extractor, _) = coordinator(StubExtractor::default(), 2);
        let summary = coordinator.enrich_all(Vec::new()).await;
        assert_eq!(summary, EnrichmentSummary::default());
        assert!(extractor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_concurrency_gate_bounds_in_flight_fetches() {
        let mut stub = StubExtractor::default().with_delay(Duration::from_millis(50));
        for i in 0..8 {
            stub = stub.with_page(&format!("https://example.com/{}", i), "<p>x</p>");
        }
        let (coordinator, extractor, _) = coordinator(stub, 3);
        let mut items: Vec<Item> = (0..8).map(|i| item(&i.to_string())).collect();

        let summary = coordinator.enrich_all(items.iter_mut().collect()).await;

        assert_eq!(summary.enriched, 8);
        assert_eq!(extractor.calls().len(), 8);
        assert!(extractor.peak_in_flight() <= 3);
        assert!(extractor.peak_in_flight() > 1, "fetches should overlap");
    }

    #[tokio::test]
    async fn test_items_with_content_are_never_fetched() {
        let (coordinator, extractor, _) = coordinator(
            StubExtractor::default()
                .with_page("https://example.com/a", "<p>new</p>")
                .with_page("https://example.com/b", "<p>new</p>"),
            4,
        );
        let mut items = vec![item("a"), item("b")];
        items[0].content = "<p>original</p>".to_string();

        let window = SelectionWindow::new(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(), 10);
        let selected = select(&mut items, &window, coordinator.enricher().observer());
        coordinator.enrich_all(selected).await;

        assert_eq!(items[0].content, "<p>original</p>");
        assert_eq!(items[1].content, "<p>new</p>");
        assert_eq!(extractor.calls(), vec!["https://example.com/b".to_string()]);
    }
}
