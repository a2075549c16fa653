//! RARBG-compatible torrentapi endpoints.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::super::http::{get_json, get_text};
use super::super::magnet::is_magnet;
use super::super::title::clean_title;
use super::super::{SourceError, SourceTag, TorrentRecord};
use super::{encode_query, lenient_u32, lenient_u64, Source};

pub const DEFAULT_BASE_URL: &str = "https://torrentapi.org";

/// torrentapi's "no results found" error code.
const NO_RESULTS_ERROR_CODE: u32 = 20;

/// RARBG source.
///
/// torrentapi hands out a short-lived token that every search must carry,
/// and rejects searches made too soon after the token was issued.
pub struct RarbgSource {
    client: Client,
    base_url: String,
    app_id: String,
    token_delay: Duration,
}

impl RarbgSource {
    pub fn new(
        client: Client,
        base_url: Option<String>,
        app_id: impl Into<String>,
        token_delay: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            app_id: app_id.into(),
            token_delay,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/pubapi_v2.php", self.base_url.trim_end_matches('/'))
    }

    fn token_url(&self) -> String {
        format!(
            "{}?get_token=get_token&app_id={}",
            self.endpoint(),
            urlencoding::encode(&self.app_id)
        )
    }

    fn search_url(&self, query: &str, token: &str) -> String {
        format!(
            "{}?mode=search&search_string={}&format=json_extended&app_id={}&token={}",
            self.endpoint(),
            encode_query(query),
            urlencoding::encode(&self.app_id),
            urlencoding::encode(token)
        )
    }

    async fn fetch_token(&self) -> Result<String, SourceError> {
        let response: TokenResponse = get_json(&self.client, &self.token_url()).await?;
        response
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SourceError::Parse("torrentapi returned no token".to_string()))
    }
}

#[async_trait]
impl Source for RarbgSource {
    fn tag(&self) -> SourceTag {
        SourceTag::Rarbg
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn search(&self, query: &str, limit_hint: usize) -> Result<Vec<TorrentRecord>, SourceError> {
        let token = self.fetch_token().await?;

        if !self.token_delay.is_zero() {
            tokio::time::sleep(self.token_delay).await;
        }

        let body = get_text(&self.client, &self.search_url(query, &token)).await?;
        let records = parse_results(&body, limit_hint)?;
        debug!(results = records.len(), "RARBG search complete");
        Ok(records)
    }
}

/// Parse a torrentapi `json_extended` search response.
pub(crate) fn parse_results(body: &str, limit: usize) -> Result<Vec<TorrentRecord>, SourceError> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::Parse(format!("Failed to parse torrentapi response: {}", e)))?;

    let Some(entries) = response.torrent_results else {
        return match response.error_code {
            Some(NO_RESULTS_ERROR_CODE) => Ok(Vec::new()),
            _ => Err(SourceError::Parse(format!(
                "torrentapi error: {}",
                response.error.as_deref().unwrap_or("missing torrent_results")
            ))),
        };
    };

    Ok(entries
        .into_iter()
        .filter(|e| !e.title.trim().is_empty())
        .take(limit)
        .map(|e| TorrentRecord {
            size_bytes: e.size,
            seeders: e.seeders,
            leechers: e.leechers,
            magnet_uri: e.download.filter(|d| is_magnet(d)),
            details_url: e.info_page,
            category: e.category,
            uploaded: e.pubdate,
            ..TorrentRecord::new(clean_title(&e.title), SourceTag::Rarbg)
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    torrent_results: Option<Vec<RarbgEntry>>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_code: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RarbgEntry {
    #[serde(default)]
    title: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    seeders: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    leechers: u32,
    #[serde(default, deserialize_with = "lenient_u64")]
    size: u64,
    #[serde(default)]
    download: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    pubdate: Option<String>,
    #[serde(default)]
    info_page: Option<String>,
}
