//! Per-site source adapters.
//!
//! Every indexing site implements [`Source`]: build the site's search URL,
//! fetch it, and parse the page (HTML or JSON) into [`TorrentRecord`]s.
//! Parsing lives in plain functions next to each adapter so it can be tested
//! against captured pages without any network.

mod audiostorrent;
mod dynamic;
mod html;
mod piratebay;
mod rarbg;
mod x1337;

pub use audiostorrent::AudiostorrentSource;
pub use dynamic::DynamicSource;
pub use piratebay::PirateBaySource;
pub use rarbg::RarbgSource;
pub use x1337::X1337Source;

pub(crate) mod defaults {
    pub use super::audiostorrent::DEFAULT_BASE_URL as AUDIOSTORRENT;
    pub use super::piratebay::DEFAULT_BASE_URL as PIRATEBAY;
    pub use super::rarbg::DEFAULT_BASE_URL as RARBG;
    pub use super::x1337::DEFAULT_BASE_URL as X1337;
}

use async_trait::async_trait;
use regex_lite::Regex;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use std::time::Instant;
use url::Url;

use super::http::get_text;
use super::{MagnetLookup, SourceError, SourceFailure, SourceResult, SourceTag, TorrentRecord};

/// A torrent indexing site.
#[async_trait]
pub trait Source: Send + Sync {
    /// Tag stamped on every record this source produces.
    fn tag(&self) -> SourceTag;

    /// Site root the search URLs are built from.
    fn base_url(&self) -> &str;

    /// Search the site. At most `limit_hint` records are returned.
    async fn search(&self, query: &str, limit_hint: usize)
        -> Result<Vec<TorrentRecord>, SourceError>;

    /// Get a magnet URI for one of this source's records, fetching the
    /// detail page when the search page did not carry one. Sources that
    /// fetch the page also report a size for records listed without one.
    async fn resolve_magnet(&self, record: &TorrentRecord) -> Result<MagnetLookup, SourceError> {
        Ok(MagnetLookup::listed(record))
    }
}

/// Run one source's search and convert any error into a tagged outcome.
pub async fn run_source(source: &dyn Source, query: &str, limit_hint: usize) -> SourceResult {
    let start = Instant::now();
    let outcome = source
        .search(query, limit_hint)
        .await
        .map(|mut records| {
            records.truncate(limit_hint);
            records
        })
        .map_err(SourceFailure::from);

    SourceResult {
        source: source.tag(),
        outcome,
        elapsed_ms: start.elapsed().as_millis() as u64,
    }
}

/// Encode a query for a site's search path or parameter: words joined by
/// `+`, everything else percent-encoded.
pub(crate) fn encode_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(|word| urlencoding::encode(word).into_owned())
        .collect::<Vec<_>>()
        .join("+")
}

/// Resolve a possibly relative link against a site's base URL.
pub(crate) fn join_url(base_url: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let base = Url::parse(base_url).ok()?;
    base.join(href).ok().map(String::from)
}

/// Parse a scraped counter ("1,523", " 42 "); anything else is 0.
pub(crate) fn parse_count(text: &str) -> u32 {
    let digits: String = text.trim().chars().filter(|c| *c != ',').collect();
    digits.parse().unwrap_or(0)
}

/// Fetch a record's detail page and pull the first magnet link matching
/// `magnet_selector`.
///
/// With a `size_pattern`, a record listed with size 0 also gets the first
/// size the pattern finds in the page text, once a magnet was found.
pub(crate) async fn magnet_from_detail_page(
    client: &Client,
    record: &TorrentRecord,
    magnet_selector: &str,
    size_pattern: Option<&Regex>,
) -> Result<MagnetLookup, SourceError> {
    if record.magnet_uri.is_some() {
        return Ok(MagnetLookup::listed(record));
    }
    let Some(url) = record.details_url.as_deref() else {
        return Ok(MagnetLookup::default());
    };
    let body = get_text(client, url).await?;
    let magnet_uri = html::find_magnet(&body, magnet_selector)?;

    let size_bytes = match size_pattern {
        Some(pattern) if magnet_uri.is_some() && record.size_bytes == 0 => {
            html::find_size(&body, pattern)
        }
        _ => None,
    };
    Ok(MagnetLookup {
        magnet_uri,
        size_bytes,
    })
}

/// Deserialize a count that sites send either as a number or a string.
/// Negative, fractional or malformed values become 0.
pub(crate) fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// [`lenient_u64`] clamped to `u32`.
pub(crate) fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_u64(deserializer).map(|v| u32::try_from(v).unwrap_or(u32::MAX))
}
