//! Sites described entirely by configuration (URL template + CSS selectors).

use async_trait::async_trait;
use regex_lite::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::config::validate::{parse_selector, validate_site};
use crate::config::{ConfigError, SiteConfig};

use super::super::http::get_text;
use super::super::size::parse_size;
use super::super::title::clean_title;
use super::super::{MagnetLookup, SourceError, SourceTag, TorrentRecord};
use super::html::{magnet_in, text_of};
use super::{encode_query, join_url, magnet_from_detail_page, parse_count, Source};

/// Compiled selectors for one site.
struct Selectors {
    result_item: Selector,
    title: Selector,
    title_link: Option<Selector>,
    size: Option<Selector>,
    seeders: Option<Selector>,
    leechers: Option<Selector>,
    magnet: Selector,
    anchor: Selector,
}

/// A source scraped through a [`SiteConfig`].
pub struct DynamicSource {
    client: Client,
    tag: SourceTag,
    base_url: String,
    url_template: String,
    selectors: Selectors,
    magnet_css: String,
    size_regex: Regex,
}

impl DynamicSource {
    /// Compile a site definition. Fails on anything that would make every
    /// search against this site fail.
    pub fn new(client: Client, key: &str, site: &SiteConfig) -> Result<Self, ConfigError> {
        validate_site(key, site)?;

        let field = |name: &str| format!("sites.{}.selectors.{}", key, name);
        let optional = |name: &str, css: &Option<String>| {
            css.as_deref()
                .map(|css| parse_selector(&field(name), css))
                .transpose()
        };
        let s = &site.selectors;
        let selectors = Selectors {
            result_item: parse_selector(&field("result_item"), &s.result_item)?,
            title: parse_selector(&field("title"), &s.title)?,
            title_link: optional("title_link", &s.title_link)?,
            size: optional("size", &s.size)?,
            seeders: optional("seeders", &s.seeders)?,
            leechers: optional("leechers", &s.leechers)?,
            magnet: parse_selector(&field("magnet"), &s.magnet)?,
            anchor: parse_selector("anchor", "a[href]")?,
        };
        let size_regex = Regex::new(&site.patterns.size_regex).map_err(|e| {
            ConfigError::ValidationError(format!("sites.{}.patterns.size_regex: {}", key, e))
        })?;

        Ok(Self {
            client,
            tag: SourceTag::Custom(site.display_name(key).to_string()),
            base_url: site.base_url.clone(),
            url_template: site.search.url_template.clone(),
            selectors,
            magnet_css: s.magnet.clone(),
            size_regex,
        })
    }

    fn search_url(&self, query: &str) -> String {
        self.url_template
            .replace("{base_url}", self.base_url.trim_end_matches('/'))
            .replace("{query}", &encode_query(query))
    }

    /// Parse a result page with the configured selectors.
    pub(crate) fn parse_results(&self, page: &str, limit: usize) -> Vec<TorrentRecord> {
        let document = Html::parse_document(page);
        document
            .select(&self.selectors.result_item)
            .filter_map(|item| self.parse_item(item))
            .take(limit)
            .collect()
    }

    fn parse_item(&self, item: ElementRef<'_>) -> Option<TorrentRecord> {
        let sel = &self.selectors;

        let title_el = item.select(&sel.title).next()?;
        let title = clean_title(&text_of(title_el));
        if title.is_empty() {
            return None;
        }

        let link_el = match &sel.title_link {
            Some(title_link) => item.select(title_link).next(),
            None => Some(title_el),
        };
        let details_url = link_el
            .and_then(|el| link_href(el, &sel.anchor))
            .and_then(|href| join_url(&self.base_url, href));

        let size_bytes = match &sel.size {
            Some(size) => item
                .select(size)
                .next()
                .map(|el| parse_size(&text_of(el)))
                .unwrap_or(0),
            None => self
                .size_regex
                .captures(&text_of(item))
                .and_then(|caps| caps.get(1).or_else(|| caps.get(0)))
                .map(|m| parse_size(m.as_str()))
                .unwrap_or(0),
        };

        let count = |selector: &Option<Selector>| {
            selector
                .as_ref()
                .and_then(|s| item.select(s).next())
                .map(|el| parse_count(&text_of(el)))
                .unwrap_or(0)
        };

        Some(TorrentRecord {
            size_bytes,
            seeders: count(&sel.seeders),
            leechers: count(&sel.leechers),
            magnet_uri: magnet_in(item, &sel.magnet),
            details_url,
            ..TorrentRecord::new(title, self.tag.clone())
        })
    }
}

/// The `href` of `el` itself, of its closest enclosing anchor, or of the
/// first anchor inside it.
fn link_href<'a>(el: ElementRef<'a>, anchor: &Selector) -> Option<&'a str> {
    if el.value().name() == "a" {
        return el.value().attr("href");
    }
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == "a")
        .or_else(|| el.select(anchor).next())
        .and_then(|a| a.value().attr("href"))
}

#[async_trait]
impl Source for DynamicSource {
    fn tag(&self) -> SourceTag {
        self.tag.clone()
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn search(&self, query: &str, limit_hint: usize) -> Result<Vec<TorrentRecord>, SourceError> {
        let body = get_text(&self.client, &self.search_url(query)).await?;
        let records = self.parse_results(&body, limit_hint);
        debug!(source = %self.tag, results = records.len(), "site search complete");
        Ok(records)
    }

    async fn resolve_magnet(&self, record: &TorrentRecord) -> Result<MagnetLookup, SourceError> {
        magnet_from_detail_page(
            &self.client,
            record,
            &self.magnet_css,
            Some(&self.size_regex),
        )
        .await
    }
}
