//! Mock source for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::searcher::sources::Source;
use crate::searcher::{MagnetLookup, SourceError, SourceTag, TorrentRecord};

/// Produces a fresh error for every failing search.
type ErrorFactory = Arc<dyn Fn() -> SourceError + Send + Sync>;

/// Mock implementation of the [`Source`] trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable records
/// - Simulate slow sites and failures
/// - Track search queries for assertions
///
/// Clones share the recorded queries, so keep a clone to inspect a source
/// after handing it to a searcher.
///
/// # Example
///
/// ```rust,ignore
/// use turok_core::testing::{MockSource, fixtures};
///
/// let source = MockSource::new(SourceTag::ThePirateBay)
///     .with_records(vec![fixtures::record("Ubuntu 24.04", SourceTag::ThePirateBay, 120)])
///     .with_delay(Duration::from_millis(50));
/// let handle = source.clone();
///
/// let searcher = TorrentSearcher::new(vec![Arc::new(source)], SearchPolicy::default());
/// searcher.search(&SearchQuery::new("ubuntu")).await?;
///
/// assert_eq!(handle.recorded_queries().await, vec!["ubuntu"]);
/// ```
#[derive(Clone)]
pub struct MockSource {
    tag: SourceTag,
    base_url: String,
    records: Vec<TorrentRecord>,
    delay: Option<Duration>,
    error: Option<ErrorFactory>,
    magnet: Option<String>,
    detail_size: Option<u64>,
    queries: Arc<RwLock<Vec<String>>>,
}

impl std::fmt::Debug for MockSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSource")
            .field("tag", &self.tag)
            .field("records", &self.records.len())
            .field("delay", &self.delay)
            .field("error", &self.error.as_ref().map(|_| "<error>"))
            .field("magnet", &self.magnet)
            .field("detail_size", &self.detail_size)
            .finish()
    }
}

impl MockSource {
    /// Create a mock source that answers every search with no records.
    pub fn new(tag: SourceTag) -> Self {
        Self {
            base_url: format!("https://{}.invalid", tag.as_str().to_lowercase()),
            tag,
            records: Vec::new(),
            delay: None,
            error: None,
            magnet: None,
            detail_size: None,
            queries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Records returned by every search.
    pub fn with_records(mut self, records: Vec<TorrentRecord>) -> Self {
        self.records = records;
        self
    }

    /// Wait this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail every search with the error `make_error` builds.
    pub fn with_error<F>(mut self, make_error: F) -> Self
    where
        F: Fn() -> SourceError + Send + Sync + 'static,
    {
        self.error = Some(Arc::new(make_error));
        self
    }

    /// Magnet returned by `resolve_magnet` for any record.
    pub fn with_magnet(mut self, magnet: impl Into<String>) -> Self {
        self.magnet = Some(magnet.into());
        self
    }

    /// Size reported by `resolve_magnet` for records listed without one.
    pub fn with_detail_size(mut self, size_bytes: u64) -> Self {
        self.detail_size = Some(size_bytes);
        self
    }

    /// Queries searched so far, in order.
    pub async fn recorded_queries(&self) -> Vec<String> {
        self.queries.read().await.clone()
    }

    /// Number of searches performed.
    pub async fn search_count(&self) -> usize {
        self.queries.read().await.len()
    }
}

#[async_trait]
impl Source for MockSource {
    fn tag(&self) -> SourceTag {
        self.tag.clone()
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn search(&self, query: &str, limit_hint: usize) -> Result<Vec<TorrentRecord>, SourceError> {
        self.queries.write().await.push(query.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(make_error) = &self.error {
            return Err(make_error());
        }

        Ok(self.records.iter().take(limit_hint).cloned().collect())
    }

    async fn resolve_magnet(&self, record: &TorrentRecord) -> Result<MagnetLookup, SourceError> {
        let mut lookup = MagnetLookup::listed(record);
        if let Some(magnet) = &self.magnet {
            lookup.magnet_uri = Some(magnet.clone());
        }
        if record.size_bytes == 0 {
            lookup.size_bytes = self.detail_size;
        }
        Ok(lookup)
    }
}
