//! The Pirate Bay, through the apibay JSON API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::super::http::get_text;
use super::super::magnet::magnet_from_hash;
use super::super::title::clean_title;
use super::super::{SourceError, SourceTag, TorrentRecord};
use super::{encode_query, lenient_u32, lenient_u64, Source};

pub const DEFAULT_BASE_URL: &str = "https://apibay.org";

/// The Pirate Bay source.
///
/// apibay answers a search with a JSON array. An empty search is reported as
/// a single placeholder entry with id `"0"`.
pub struct PirateBaySource {
    client: Client,
    base_url: String,
}

impl PirateBaySource {
    pub fn new(client: Client, base_url: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/q.php?q={}",
            self.base_url.trim_end_matches('/'),
            encode_query(query)
        )
    }
}

#[async_trait]
impl Source for PirateBaySource {
    fn tag(&self) -> SourceTag {
        SourceTag::ThePirateBay
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn search(&self, query: &str, limit_hint: usize) -> Result<Vec<TorrentRecord>, SourceError> {
        let body = get_text(&self.client, &self.search_url(query)).await?;
        let records = parse_results(&body, limit_hint)?;
        debug!(results = records.len(), "TPB search complete");
        Ok(records)
    }
}

/// Parse an apibay search response.
pub(crate) fn parse_results(body: &str, limit: usize) -> Result<Vec<TorrentRecord>, SourceError> {
    let entries: Vec<ApibayEntry> = serde_json::from_str(body)
        .map_err(|e| SourceError::Parse(format!("Failed to parse apibay response: {}", e)))?;

    if entries.first().map(|e| e.id == 0).unwrap_or(true) {
        return Ok(Vec::new());
    }

    Ok(entries
        .into_iter()
        .filter(|e| !e.info_hash.trim().is_empty() && !e.name.trim().is_empty())
        .take(limit)
        .map(|e| TorrentRecord {
            magnet_uri: Some(magnet_from_hash(e.info_hash.trim(), &e.name)),
            size_bytes: e.size,
            seeders: e.seeders,
            leechers: e.leechers,
            uploader: e.username.filter(|u| !u.is_empty()),
            ..TorrentRecord::new(clean_title(&e.name), SourceTag::ThePirateBay)
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct ApibayEntry {
    #[serde(default, deserialize_with = "lenient_u64")]
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    info_hash: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    seeders: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    leechers: u32,
    #[serde(default, deserialize_with = "lenient_u64")]
    size: u64,
    #[serde(default)]
    username: Option<String>,
}
