use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::searcher::SortKey;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    /// Selector-driven sites, keyed by a short identifier.
    #[serde(default)]
    pub sites: BTreeMap<String, SiteConfig>,
}

/// Search pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Per-source timeout in seconds (default: 15)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Results returned when the caller does not ask for a count (default: 10)
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default)]
    pub default_sort: SortKey,
    /// Cap on records taken from any single source (default: 30)
    #[serde(default = "default_max_results_per_source")]
    pub max_results_per_source: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Relative size difference under which same-titled records are merged
    #[serde(default = "default_size_tolerance")]
    pub size_tolerance: f64,
    /// Tie-break order when duplicate records have equal seeders
    #[serde(default = "default_source_priority")]
    pub source_priority: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            default_limit: default_limit(),
            default_sort: SortKey::default(),
            max_results_per_source: default_max_results_per_source(),
            user_agent: default_user_agent(),
            size_tolerance: default_size_tolerance(),
            source_priority: default_source_priority(),
        }
    }
}

fn default_timeout() -> u64 {
    15
}

fn default_limit() -> usize {
    10
}

fn default_max_results_per_source() -> usize {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_size_tolerance() -> f64 {
    0.05
}

fn default_source_priority() -> Vec<String> {
    ["TPB", "1337x", "RARBG", "Audiostorrent"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Built-in source toggles
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub piratebay: BuiltinSourceConfig,
    #[serde(default)]
    pub x1337: BuiltinSourceConfig,
    #[serde(default)]
    pub rarbg: RarbgConfig,
    #[serde(default = "default_audiostorrent")]
    pub audiostorrent: BuiltinSourceConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            piratebay: BuiltinSourceConfig::default(),
            x1337: BuiltinSourceConfig::default(),
            rarbg: RarbgConfig::default(),
            audiostorrent: default_audiostorrent(),
        }
    }
}

fn default_audiostorrent() -> BuiltinSourceConfig {
    BuiltinSourceConfig {
        enabled: false,
        base_url: None,
    }
}

/// Configuration shared by the built-in sources
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuiltinSourceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Override the site's base URL (mirrors, testing)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for BuiltinSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// RARBG-compatible torrentapi configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RarbgConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_app_id")]
    pub app_id: String,
    /// Delay between the token request and the search request
    #[serde(default = "default_token_delay_ms")]
    pub token_delay_ms: u64,
}

impl Default for RarbgConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
            app_id: default_app_id(),
            token_delay_ms: default_token_delay_ms(),
        }
    }
}

fn default_app_id() -> String {
    "turok".to_string()
}

fn default_token_delay_ms() -> u64 {
    2000
}

/// A site scraped through CSS selectors
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    /// Display name; the table key is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub base_url: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub search: SiteSearchConfig,
    pub selectors: SelectorsConfig,
    #[serde(default)]
    pub patterns: PatternsConfig,
}

/// How a site's search URL is built
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteSearchConfig {
    /// e.g. "{base_url}/?s={query}"
    pub url_template: String,
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "GET".to_string()
}

/// CSS selectors applied to a site's result page
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectorsConfig {
    pub result_item: String,
    pub title: String,
    /// Magnet anchor, searched in the result item and on the detail page
    #[serde(default = "default_magnet_selector")]
    pub magnet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seeders: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leechers: Option<String>,
}

fn default_magnet_selector() -> String {
    "a[href^='magnet:']".to_string()
}

/// Regex patterns used when selectors are not enough
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PatternsConfig {
    /// Finds a size inside the result item's text when no size selector is set
    #[serde(default = "default_size_regex")]
    pub size_regex: String,
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            size_regex: default_size_regex(),
        }
    }
}

fn default_size_regex() -> String {
    r"(?i)(\d+(?:\.\d+)?\s*(?:TB|GB|MB|KB))".to_string()
}

impl SiteConfig {
    /// Name shown as the record's source tag.
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(key)
    }
}
