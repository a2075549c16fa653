//! The multi-source searcher: dispatch, aggregate, report.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::{validate_config, Config};
use crate::metrics;

use super::aggregator::aggregate;
use super::dedup::DedupPolicy;
use super::executor::{dispatch, dispatch_streaming};
use super::http::build_client;
use super::magnet::with_trackers;
use super::registry::build_sources;
use super::sources::Source;
use super::{
    MagnetLookup, RankedList, SearchDiagnostics, SearchError, SearchOutcome, SearchQuery,
    SearchUpdate, Searcher, SourceError, SourceInfo, SourceResult, TorrentRecord,
};

/// How a search is run and ranked.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPolicy {
    /// Deadline for each source, counted from dispatch.
    pub per_source_timeout: Duration,
    /// Cap on records taken from any one source.
    pub max_results_per_source: usize,
    pub dedup: DedupPolicy,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            per_source_timeout: Duration::from_secs(15),
            max_results_per_source: 30,
            dedup: DedupPolicy::default(),
        }
    }
}

impl SearchPolicy {
    pub fn from_config(config: &Config) -> Self {
        let search = &config.search;
        Self {
            per_source_timeout: Duration::from_secs(search.timeout_secs),
            max_results_per_source: search.max_results_per_source,
            dedup: DedupPolicy::from_names(search.size_tolerance, &search.source_priority),
        }
    }
}

/// Searches every configured source concurrently and merges the results.
pub struct TorrentSearcher {
    sources: Vec<Arc<dyn Source>>,
    policy: SearchPolicy,
}

impl TorrentSearcher {
    pub fn new(sources: Vec<Arc<dyn Source>>, policy: SearchPolicy) -> Self {
        Self { sources, policy }
    }

    /// Validate `config` and build its enabled sources around one shared
    /// HTTP client. Nothing touches the network here.
    pub fn from_config(config: &Config) -> Result<Self, SearchError> {
        validate_config(config)?;
        let policy = SearchPolicy::from_config(config);
        let client = build_client(&config.search.user_agent, policy.per_source_timeout)?;
        let sources = build_sources(config, client)?;
        Ok(Self::new(sources, policy))
    }

    pub fn policy(&self) -> &SearchPolicy {
        &self.policy
    }

    fn check(&self, query: &SearchQuery) -> Result<(), SearchError> {
        if query.query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        if self.sources.is_empty() {
            return Err(SearchError::NoSources);
        }
        Ok(())
    }

    /// Start a search and report each source's progress as it happens.
    ///
    /// Pass the collected `Finished` results to [`TorrentSearcher::rank`] to
    /// get the same ranked list [`Searcher::search`] would return.
    pub fn search_streaming(
        &self,
        query: &SearchQuery,
    ) -> Result<mpsc::Receiver<SearchUpdate>, SearchError> {
        self.check(query)?;
        Ok(dispatch_streaming(
            query.query.trim(),
            &self.sources,
            self.policy.max_results_per_source,
            self.policy.per_source_timeout,
        ))
    }

    /// Merge per-source outcomes into the ranked list for `query`.
    pub fn rank(
        &self,
        query: &SearchQuery,
        results: &[SourceResult],
    ) -> (RankedList, SearchDiagnostics) {
        aggregate(results, query.sort, query.limit, &self.policy.dedup)
    }

    /// Get a ready-to-open magnet for `record`, with public trackers added.
    ///
    /// Asks the record's source first (which may fetch the detail page) and
    /// falls back to the magnet the record already carries. A record listed
    /// without a size takes the one its detail page shows.
    pub async fn resolve_magnet(
        &self,
        record: &mut TorrentRecord,
    ) -> Result<Option<String>, SourceError> {
        let source = self.sources.iter().find(|s| s.tag() == record.source);

        let lookup = match source {
            Some(source) => match source.resolve_magnet(record).await {
                Ok(lookup) => lookup,
                Err(e) if record.magnet_uri.is_some() => {
                    warn!(source = %record.source, error = %e, "Magnet lookup failed, using listed magnet");
                    MagnetLookup::listed(record)
                }
                Err(e) => return Err(e),
            },
            None => MagnetLookup::listed(record),
        };

        if record.size_bytes == 0 {
            if let Some(size_bytes) = lookup.size_bytes {
                debug!(source = %record.source, size_bytes, "Size taken from detail page");
                record.size_bytes = size_bytes;
            }
        }
        let magnet = lookup.magnet_uri.or_else(|| record.magnet_uri.clone());

        Ok(magnet.map(|m| with_trackers(&m)))
    }
}

#[async_trait]
impl Searcher for TorrentSearcher {
    fn name(&self) -> &str {
        "turok"
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchOutcome, SearchError> {
        self.check(query)?;
        let start = Instant::now();

        let results = dispatch(
            query.query.trim(),
            &self.sources,
            self.policy.max_results_per_source,
            self.policy.per_source_timeout,
        )
        .await;
        let (records, diagnostics) = self.rank(query, &results);

        let duration_ms = start.elapsed().as_millis() as u64;
        metrics::SEARCH_RESULTS.observe(records.len() as f64);
        info!(
            query = %query.query,
            results = records.len(),
            succeeded = diagnostics.succeeded(),
            failed = diagnostics.failed(),
            duration_ms,
            "Search complete"
        );

        Ok(SearchOutcome {
            query: query.clone(),
            records,
            diagnostics,
            duration_ms,
        })
    }

    fn source_info(&self) -> Vec<SourceInfo> {
        self.sources
            .iter()
            .map(|s| SourceInfo {
                tag: s.tag(),
                base_url: s.base_url().to_string(),
                enabled: true,
            })
            .collect()
    }
}
