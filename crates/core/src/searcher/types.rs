//! Types for the torrent search system.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::ConfigError;

use super::size::format_size;

/// Query parameters for a torrent search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text search query.
    pub query: String,
    /// Maximum results to return.
    pub limit: usize,
    /// Ordering of the ranked list.
    #[serde(default)]
    pub sort: SortKey,
}

impl SearchQuery {
    /// Create a query with the default limit (10) and sort (seeders).
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: 10,
            sort: SortKey::default(),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }
}

/// Ordering applied to the ranked list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Most seeders first.
    #[default]
    Seeders,
    /// Largest first.
    Size,
    /// Title, case-insensitive, A to Z.
    Name,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortKey::Seeders => "seeders",
            SortKey::Size => "size",
            SortKey::Name => "name",
        })
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "seeders" | "seeds" => Ok(SortKey::Seeders),
            "size" => Ok(SortKey::Size),
            "name" | "title" => Ok(SortKey::Name),
            other => Err(format!(
                "unknown sort key '{}' (expected seeders, size or name)",
                other
            )),
        }
    }
}

/// Identifies the indexing site that produced a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum SourceTag {
    ThePirateBay,
    X1337,
    Rarbg,
    Audiostorrent,
    /// A selector-driven site from configuration.
    Custom(String),
}

impl SourceTag {
    /// Short display name ("TPB", "1337x", ...).
    pub fn as_str(&self) -> &str {
        match self {
            SourceTag::ThePirateBay => "TPB",
            SourceTag::X1337 => "1337x",
            SourceTag::Rarbg => "RARBG",
            SourceTag::Audiostorrent => "Audiostorrent",
            SourceTag::Custom(name) => name,
        }
    }

    /// Parse a display name back into a tag. Matching built-in names is
    /// case-insensitive; anything else becomes `Custom`.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "tpb" | "piratebay" | "thepiratebay" => SourceTag::ThePirateBay,
            "1337x" | "x1337" => SourceTag::X1337,
            "rarbg" => SourceTag::Rarbg,
            "audiostorrent" => SourceTag::Audiostorrent,
            _ => SourceTag::Custom(name.trim().to_string()),
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for SourceTag {
    fn from(name: String) -> Self {
        SourceTag::parse(&name)
    }
}

impl From<SourceTag> for String {
    fn from(tag: SourceTag) -> Self {
        tag.as_str().to_string()
    }
}

/// A single search result, normalized across sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentRecord {
    /// Title with site decoration removed.
    pub title: String,
    /// Size in bytes (0 when unknown).
    pub size_bytes: u64,
    pub seeders: u32,
    pub leechers: u32,
    /// Which site returned this result.
    pub source: SourceTag,
    /// Magnet URI, exactly as the site published it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnet_uri: Option<String>,
    /// Direct link to the torrent page on the site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader: Option<String>,
}

impl TorrentRecord {
    /// Create a record with no links or optional metadata.
    pub fn new(title: impl Into<String>, source: SourceTag) -> Self {
        Self {
            title: title.into(),
            size_bytes: 0,
            seeders: 0,
            leechers: 0,
            source,
            magnet_uri: None,
            details_url: None,
            category: None,
            uploaded: None,
            uploader: None,
        }
    }

    /// Swarm health from the seeder count and seed/leech ratio.
    pub fn health(&self) -> Health {
        if self.seeders == 0 {
            return Health::Dead;
        }
        let ratio = self.seeders as f64 / self.leechers.max(1) as f64;
        if self.seeders > 100 && ratio > 2.0 {
            Health::Excellent
        } else if self.seeders > 20 && ratio > 1.0 {
            Health::Good
        } else if self.seeders > 5 {
            Health::Fair
        } else {
            Health::Poor
        }
    }

    /// Human-readable size ("1.5 GB").
    pub fn size_formatted(&self) -> String {
        format_size(self.size_bytes)
    }
}

/// What a source found when asked for a record's magnet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MagnetLookup {
    pub magnet_uri: Option<String>,
    /// Size read from the detail page, only looked for when the listing
    /// carried none.
    pub size_bytes: Option<u64>,
}

impl MagnetLookup {
    /// The record's own magnet, without any extra lookup.
    pub fn listed(record: &TorrentRecord) -> Self {
        Self {
            magnet_uri: record.magnet_uri.clone(),
            size_bytes: None,
        }
    }
}

/// Swarm health bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Health {
    Dead,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Health::Dead => "dead",
            Health::Poor => "poor",
            Health::Fair => "fair",
            Health::Good => "good",
            Health::Excellent => "excellent",
        })
    }
}

/// Final ordered output of a search.
pub type RankedList = Vec<TorrentRecord>;

/// Category of a per-source failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Network,
    HttpStatus,
    Parse,
    Timeout,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureKind::Network => "network",
            FailureKind::HttpStatus => "http-status",
            FailureKind::Parse => "parse",
            FailureKind::Timeout => "timeout",
        })
    }
}

/// Errors a single source can hit while searching.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Unexpected response: {0}")]
    Parse(String),

    #[error("Request timeout")]
    Timeout,
}

impl SourceError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SourceError::Network(_) => FailureKind::Network,
            SourceError::HttpStatus { .. } => FailureKind::HttpStatus,
            SourceError::Parse(_) => FailureKind::Parse,
            SourceError::Timeout => FailureKind::Timeout,
        }
    }
}

/// A failed source search, as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<SourceError> for SourceFailure {
    fn from(err: SourceError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Outcome of one source invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceResult {
    pub source: SourceTag,
    pub outcome: Result<Vec<TorrentRecord>, SourceFailure>,
    pub elapsed_ms: u64,
}

impl SourceResult {
    pub fn success(source: SourceTag, records: Vec<TorrentRecord>, elapsed_ms: u64) -> Self {
        Self {
            source,
            outcome: Ok(records),
            elapsed_ms,
        }
    }

    pub fn failure(source: SourceTag, failure: SourceFailure, elapsed_ms: u64) -> Self {
        Self {
            source,
            outcome: Err(failure),
            elapsed_ms,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Per-source status in a search's diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    Ok { records: usize },
    Failed { kind: FailureKind, message: String },
}

/// Diagnostics entry for one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDiagnostic {
    pub source: SourceTag,
    #[serde(flatten)]
    pub status: SourceStatus,
    pub elapsed_ms: u64,
}

/// Per-source summary of a search, for the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDiagnostics {
    pub sources: Vec<SourceDiagnostic>,
}

impl SearchDiagnostics {
    pub fn from_results(results: &[SourceResult]) -> Self {
        let sources = results
            .iter()
            .map(|r| SourceDiagnostic {
                source: r.source.clone(),
                status: match &r.outcome {
                    Ok(records) => SourceStatus::Ok {
                        records: records.len(),
                    },
                    Err(failure) => SourceStatus::Failed {
                        kind: failure.kind,
                        message: failure.message.clone(),
                    },
                },
                elapsed_ms: r.elapsed_ms,
            })
            .collect();
        Self { sources }
    }

    pub fn total(&self) -> usize {
        self.sources.len()
    }

    pub fn succeeded(&self) -> usize {
        self.sources
            .iter()
            .filter(|d| matches!(d.status, SourceStatus::Ok { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn timed_out(&self) -> usize {
        self.failures()
            .filter(|(_, kind, _)| *kind == FailureKind::Timeout)
            .count()
    }

    /// Failed sources with their failure kind and message.
    pub fn failures(&self) -> impl Iterator<Item = (&SourceTag, FailureKind, &str)> + '_ {
        self.sources.iter().filter_map(|d| match &d.status {
            SourceStatus::Failed { kind, message } => Some((&d.source, *kind, message.as_str())),
            SourceStatus::Ok { .. } => None,
        })
    }
}

impl fmt::Display for SearchDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failed() == 0 {
            write!(f, "all {} sources responded", self.total())
        } else {
            write!(f, "{} of {} sources failed", self.failed(), self.total())
        }
    }
}

/// Ranked results of a search plus how each source fared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// The search query that was executed.
    pub query: SearchQuery,
    pub records: RankedList,
    pub diagnostics: SearchDiagnostics,
    /// How long the search took in milliseconds.
    pub duration_ms: u64,
}

/// Progress notification from a streaming search.
#[derive(Debug, Clone)]
pub enum SearchUpdate {
    /// The source's request has been launched.
    Loading { source: SourceTag },
    /// The source reached a terminal state.
    Finished(SourceResult),
}

/// A configured source, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub tag: SourceTag,
    pub base_url: String,
    pub enabled: bool,
}

/// Errors that abort a whole search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("No sources configured")]
    NoSources,

    #[error("Search query is empty")]
    EmptyQuery,
}

/// Trait for torrent search front ends.
#[async_trait]
pub trait Searcher: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Execute a search across all configured sources.
    async fn search(&self, query: &SearchQuery) -> Result<SearchOutcome, SearchError>;

    /// Sources this searcher dispatches to.
    fn source_info(&self) -> Vec<SourceInfo>;
}
