//! 1337x, scraped from its HTML search pages.

use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use tracing::debug;

use super::super::size::parse_size;
use super::super::title::clean_title;
use super::super::http::get_text;
use super::super::{MagnetLookup, SourceError, SourceTag, TorrentRecord};
use super::html::{selector, text_of};
use super::{encode_query, join_url, magnet_from_detail_page, parse_count, Source};

pub const DEFAULT_BASE_URL: &str = "https://1337x.to";

const MAGNET_SELECTOR: &str = "a[href^='magnet:']";

/// 1337x source.
///
/// Search pages only link to detail pages; the magnet is fetched on demand
/// by [`Source::resolve_magnet`].
pub struct X1337Source {
    client: Client,
    base_url: String,
}

impl X1337Source {
    pub fn new(client: Client, base_url: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search/{}/1/",
            self.base_url.trim_end_matches('/'),
            encode_query(query)
        )
    }
}

#[async_trait]
impl Source for X1337Source {
    fn tag(&self) -> SourceTag {
        SourceTag::X1337
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn search(&self, query: &str, limit_hint: usize) -> Result<Vec<TorrentRecord>, SourceError> {
        let body = get_text(&self.client, &self.search_url(query)).await?;
        let records = parse_results(&body, &self.base_url, limit_hint)?;
        debug!(results = records.len(), "1337x search complete");
        Ok(records)
    }

    async fn resolve_magnet(&self, record: &TorrentRecord) -> Result<MagnetLookup, SourceError> {
        magnet_from_detail_page(&self.client, record, MAGNET_SELECTOR, None).await
    }
}

/// Parse a 1337x search results page.
///
/// Each result row has the title link as the second anchor of the first
/// cell, then seeders, leechers, upload date, size and uploader cells. The
/// size cell also embeds the seeder count, which [`parse_size`] ignores.
pub(crate) fn parse_results(
    page: &str,
    base_url: &str,
    limit: usize,
) -> Result<Vec<TorrentRecord>, SourceError> {
    let row_sel = selector("tbody tr")?;
    let cell_sel = selector("td")?;
    let link_sel = selector("a")?;

    let document = Html::parse_document(page);
    let mut records = Vec::new();

    for row in document.select(&row_sel) {
        if records.len() >= limit {
            break;
        }

        let cells: Vec<_> = row.select(&cell_sel).collect();
        if cells.len() < 5 {
            continue;
        }

        let Some(title_link) = cells[0].select(&link_sel).nth(1) else {
            continue;
        };
        let title = clean_title(&text_of(title_link));
        if title.is_empty() {
            continue;
        }

        let uploaded = text_of(cells[3]);
        let uploader = cells.get(5).map(|c| text_of(*c)).filter(|u| !u.is_empty());

        records.push(TorrentRecord {
            size_bytes: parse_size(&text_of(cells[4])),
            seeders: parse_count(&text_of(cells[1])),
            leechers: parse_count(&text_of(cells[2])),
            details_url: title_link
                .value()
                .attr("href")
                .and_then(|href| join_url(base_url, href)),
            uploaded: Some(uploaded).filter(|u| !u.is_empty()),
            uploader,
            ..TorrentRecord::new(title, SourceTag::X1337)
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
<table class="table-list table table-responsive table-striped">
<thead><tr><th>name</th><th>se</th><th>le</th><th>time</th><th>size</th><th>uploader</th></tr></thead>
<tbody>
<tr>
  <td class="coll-1 name"><a href="/sub/18/0/" class="icon"><i class="flaticon-apps"></i></a><a href="/torrent/6001/Ubuntu-24-04-Desktop/">Ubuntu 24.04 Desktop</a></td>
  <td class="coll-2 seeds">892</td>
  <td class="coll-3 leeches">31</td>
  <td class="coll-date">Apr. 25th '24</td>
  <td class="coll-4 size mob-uploader">3.9 GB<span class="seeds">892</span></td>
  <td class="coll-5 uploader"><a href="/user/distro/">distro</a></td>
</tr>
<tr>
  <td class="coll-1 name"><a href="/sub/18/0/" class="icon"></a><a href="/torrent/6002/Ubuntu-24-04-Server/">Ubuntu 24.04 Server</a></td>
  <td class="coll-2 seeds">-</td>
  <td class="coll-3 leeches">2,104</td>
  <td class="coll-date">Apr. 26th '24</td>
  <td class="coll-4 size mob-uploader">2.6 GB<span class="seeds">0</span></td>
  <td class="coll-5 uploader"><a href="/user/distro/">distro</a></td>
</tr>
<tr>
  <td class="coll-1 name"><a href="/torrent/6003/only-one-link/">Broken row</a></td>
  <td>1</td><td>1</td><td>x</td><td>1 MB</td>
</tr>
<tr><td colspan="5">Advertisement</td></tr>
</tbody>
</table>
</body></html>"#;

    #[test]
    fn test_parse_results() {
        let records = parse_results(PAGE, "https://1337x.to", 30).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.title, "Ubuntu 24.04 Desktop");
        assert_eq!(first.seeders, 892);
        assert_eq!(first.leechers, 31);
        assert_eq!(first.size_bytes, parse_size("3.9 GB"));
        assert_eq!(first.source, SourceTag::X1337);
        assert_eq!(
            first.details_url.as_deref(),
            Some("https://1337x.to/torrent/6001/Ubuntu-24-04-Desktop/")
        );
        assert!(first.magnet_uri.is_none());
        assert_eq!(first.uploaded.as_deref(), Some("Apr. 25th '24"));
        assert_eq!(first.uploader.as_deref(), Some("distro"));

        // Unparsable seeders default to 0; thousands separators accepted
        assert_eq!(records[1].seeders, 0);
        assert_eq!(records[1].leechers, 2104);
    }

    #[test]
    fn test_parse_results_respects_limit() {
        let records = parse_results(PAGE, "https://1337x.to", 1).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_parse_page_without_table() {
        let records = parse_results("<html><body>No results</body></html>", "https://1337x.to", 30)
            .unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_search_url() {
        let source = X1337Source::new(Client::new(), None);
        assert_eq!(
            source.search_url("ubuntu 24.04"),
            "https://1337x.to/search/ubuntu+24.04/1/"
        );
    }
}
