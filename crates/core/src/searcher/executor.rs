//! Concurrent fan-out of one query to every source.
//!
//! Each source runs under its own deadline. A source that fails or times out
//! only produces a failure outcome; it never delays or cancels the others.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::metrics;

use super::sources::{run_source, Source};
use super::{FailureKind, SearchUpdate, SourceFailure, SourceResult};

/// Run one source under `timeout`, recording metrics for the outcome.
pub async fn run_with_timeout(
    source: &dyn Source,
    query: &str,
    limit_hint: usize,
    timeout: Duration,
) -> SourceResult {
    let start = Instant::now();
    let tag = source.tag();
    debug!(source = %tag, "Dispatching search");

    let result = match tokio::time::timeout(timeout, run_source(source, query, limit_hint)).await {
        Ok(result) => result,
        // The search future is dropped here, abandoning its in-flight request
        Err(_) => SourceResult::failure(
            tag.clone(),
            SourceFailure {
                kind: FailureKind::Timeout,
                message: format!("no response within {:?}", timeout),
            },
            start.elapsed().as_millis() as u64,
        ),
    };

    match &result.outcome {
        Ok(records) => {
            debug!(source = %tag, results = records.len(), elapsed_ms = result.elapsed_ms, "Source search complete");
            metrics::record_source_outcome(tag.as_str(), "ok", start.elapsed());
        }
        Err(failure) => {
            warn!(source = %tag, kind = %failure.kind, error = %failure.message, "Source search failed");
            metrics::record_source_outcome(tag.as_str(), &failure.kind.to_string(), start.elapsed());
        }
    }

    result
}

/// Search every source concurrently and wait for all of them.
///
/// The returned outcomes are in the same order as `sources`, one per source.
pub async fn dispatch(
    query: &str,
    sources: &[Arc<dyn Source>],
    limit_hint: usize,
    per_source_timeout: Duration,
) -> Vec<SourceResult> {
    let searches = sources
        .iter()
        .map(|source| run_with_timeout(source.as_ref(), query, limit_hint, per_source_timeout));

    futures::future::join_all(searches).await
}

/// Like [`dispatch`], but reports progress as it happens.
///
/// A `Loading` update is sent for every source before any result, then one
/// `Finished` update per source in completion order. The channel closes once
/// every source has finished.
pub fn dispatch_streaming(
    query: &str,
    sources: &[Arc<dyn Source>],
    limit_hint: usize,
    per_source_timeout: Duration,
) -> mpsc::Receiver<SearchUpdate> {
    // Room for every update, so no source ever waits on a slow reader
    let (tx, rx) = mpsc::channel(sources.len().max(1) * 2);

    for source in sources {
        // Cannot fail: the channel is empty and sized for every update
        let _ = tx.try_send(SearchUpdate::Loading {
            source: source.tag(),
        });
    }

    for source in sources {
        let source = Arc::clone(source);
        let query = query.to_string();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result =
                run_with_timeout(source.as_ref(), &query, limit_hint, per_source_timeout).await;
            // The receiver may have been dropped; nothing left to report to
            let _ = tx.send(SearchUpdate::Finished(result)).await;
        });
    }

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::searcher::{SourceError, SourceTag};
    use crate::testing::{fixtures, MockSource};

    fn arc(source: MockSource) -> Arc<dyn Source> {
        Arc::new(source)
    }

    #[tokio::test]
    async fn test_dispatch_preserves_source_order() {
        let sources = vec![
            arc(MockSource::new(SourceTag::ThePirateBay)
                .with_records(vec![fixtures::record("A", SourceTag::ThePirateBay, 10)])
                .with_delay(Duration::from_millis(50))),
            arc(MockSource::new(SourceTag::X1337)
                .with_records(vec![fixtures::record("B", SourceTag::X1337, 5)])),
        ];

        let results = dispatch("q", &sources, 30, Duration::from_secs(2)).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].source, SourceTag::ThePirateBay);
        assert_eq!(results[1].source, SourceTag::X1337);
        assert!(results.iter().all(|r| r.is_success()));
    }

    #[tokio::test]
    async fn test_dispatch_timeout_isolated() {
        let sources = vec![
            arc(MockSource::new(SourceTag::Rarbg).with_delay(Duration::from_secs(30))),
            arc(MockSource::new(SourceTag::ThePirateBay)
                .with_records(vec![fixtures::record("A", SourceTag::ThePirateBay, 10)])),
        ];

        let start = Instant::now();
        let results = dispatch("q", &sources, 30, Duration::from_millis(100)).await;

        assert!(start.elapsed() < Duration::from_secs(5));
        let failure = results[0].outcome.as_ref().unwrap_err();
        assert_eq!(failure.kind, FailureKind::Timeout);
        assert_eq!(results[1].outcome.as_ref().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_runs_concurrently() {
        let sources: Vec<_> = [SourceTag::ThePirateBay, SourceTag::X1337, SourceTag::Rarbg]
            .into_iter()
            .map(|tag| arc(MockSource::new(tag).with_delay(Duration::from_millis(200))))
            .collect();

        let start = Instant::now();
        let results = dispatch("q", &sources, 30, Duration::from_secs(5)).await;

        assert_eq!(results.len(), 3);
        // Sequential execution would take at least 600ms
        assert!(start.elapsed() < Duration::from_millis(550));
    }

    #[tokio::test]
    async fn test_dispatch_converts_errors() {
        let sources = vec![arc(MockSource::new(SourceTag::X1337)
            .with_error(|| SourceError::HttpStatus {
                status: 403,
                url: "https://1337x.to".into(),
            }))];

        let results = dispatch("q", &sources, 30, Duration::from_secs(1)).await;
        let failure = results[0].outcome.as_ref().unwrap_err();
        assert_eq!(failure.kind, FailureKind::HttpStatus);
        assert!(failure.message.contains("403"));
    }

    #[tokio::test]
    async fn test_dispatch_truncates_to_limit_hint() {
        let records = (0..10)
            .map(|i| fixtures::record(&format!("T{}", i), SourceTag::ThePirateBay, i))
            .collect();
        let sources = vec![arc(MockSource::new(SourceTag::ThePirateBay).with_records(records))];

        let results = dispatch("q", &sources, 3, Duration::from_secs(1)).await;
        assert_eq!(results[0].outcome.as_ref().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_dispatch_no_sources() {
        let results = dispatch("q", &[], 30, Duration::from_secs(1)).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_streaming_reports_loading_then_finished() {
        let sources = vec![
            arc(MockSource::new(SourceTag::ThePirateBay).with_delay(Duration::from_millis(50))),
            arc(MockSource::new(SourceTag::X1337)),
        ];

        let mut rx = dispatch_streaming("q", &sources, 30, Duration::from_secs(1));

        let mut updates = Vec::new();
        while let Some(update) = rx.recv().await {
            updates.push(update);
        }

        assert_eq!(updates.len(), 4);
        assert!(matches!(updates[0], SearchUpdate::Loading { .. }));
        assert!(matches!(updates[1], SearchUpdate::Loading { .. }));
        let finished: Vec<_> = updates[2..]
            .iter()
            .map(|u| match u {
                SearchUpdate::Finished(r) => r.source.clone(),
                SearchUpdate::Loading { .. } => panic!("loading after finish"),
            })
            .collect();
        // The faster source finishes first
        assert_eq!(finished, vec![SourceTag::X1337, SourceTag::ThePirateBay]);
    }
}
