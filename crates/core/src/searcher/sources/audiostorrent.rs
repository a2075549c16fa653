//! audiostorrent.com, a WordPress site for audio software.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use reqwest::Client;
use scraper::Html;
use tracing::debug;

use super::super::http::get_text;
use super::super::size::parse_size;
use super::super::title::clean_title;
use super::super::{MagnetLookup, SourceError, SourceTag, TorrentRecord};
use super::html::{selector, text_of};
use super::{encode_query, join_url, magnet_from_detail_page, Source};

pub const DEFAULT_BASE_URL: &str = "https://audiostorrent.com";

const MAGNET_SELECTOR: &str = "a[href^='magnet:']";

static SIZE_IN_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?\s*(?:TB|GB|MB|KB))").expect("size pattern is valid")
});

/// Audiostorrent source.
///
/// Search results are blog posts: no swarm counts, and the magnet lives on
/// the post page.
pub struct AudiostorrentSource {
    client: Client,
    base_url: String,
}

impl AudiostorrentSource {
    pub fn new(client: Client, base_url: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/?s={}",
            self.base_url.trim_end_matches('/'),
            encode_query(query)
        )
    }
}

#[async_trait]
impl Source for AudiostorrentSource {
    fn tag(&self) -> SourceTag {
        SourceTag::Audiostorrent
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn search(&self, query: &str, limit_hint: usize) -> Result<Vec<TorrentRecord>, SourceError> {
        let body = get_text(&self.client, &self.search_url(query)).await?;
        let records = parse_results(&body, &self.base_url, limit_hint)?;
        debug!(results = records.len(), "Audiostorrent search complete");
        Ok(records)
    }

    async fn resolve_magnet(&self, record: &TorrentRecord) -> Result<MagnetLookup, SourceError> {
        magnet_from_detail_page(&self.client, record, MAGNET_SELECTOR, Some(&*SIZE_IN_TEXT))
            .await
    }
}

/// Parse a WordPress search page: one `article` per post, titled by its
/// heading link. A size mentioned in the excerpt is picked up when present.
pub(crate) fn parse_results(
    page: &str,
    base_url: &str,
    limit: usize,
) -> Result<Vec<TorrentRecord>, SourceError> {
    let article_sel = selector("article")?;
    let title_sel = selector("h2 a, .entry-title a")?;

    let document = Html::parse_document(page);
    let mut records = Vec::new();

    for article in document.select(&article_sel) {
        if records.len() >= limit {
            break;
        }

        let Some(title_link) = article.select(&title_sel).next() else {
            continue;
        };
        let title = clean_title(&text_of(title_link));
        let Some(details_url) = title_link
            .value()
            .attr("href")
            .and_then(|href| join_url(base_url, href))
        else {
            continue;
        };
        if title.is_empty() {
            continue;
        }

        let size_bytes = SIZE_IN_TEXT
            .captures(&text_of(article))
            .map(|caps| parse_size(&caps[1]))
            .unwrap_or(0);

        records.push(TorrentRecord {
            size_bytes,
            details_url: Some(details_url),
            ..TorrentRecord::new(title, SourceTag::Audiostorrent)
        });
    }

    Ok(records)
}
