use scraper::Selector;
use std::collections::HashMap;
use url::Url;

use super::{
    types::{Config, SiteConfig},
    ConfigError,
};
use crate::searcher::SourceTag;

/// Validate configuration
/// Currently validates:
/// - Search timeout, limits and size tolerance are usable
/// - Built-in base URL overrides parse as URLs
/// - Every enabled site has a parseable base URL, a `{query}` placeholder,
///   valid CSS selectors and a valid size pattern
/// - Site names do not shadow built-in sources or each other
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let search = &config.search;
    if search.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "search.timeout_secs cannot be 0".to_string(),
        ));
    }
    if search.default_limit == 0 {
        return Err(ConfigError::ValidationError(
            "search.default_limit cannot be 0".to_string(),
        ));
    }
    if search.max_results_per_source == 0 {
        return Err(ConfigError::ValidationError(
            "search.max_results_per_source cannot be 0".to_string(),
        ));
    }
    if !(0.0..1.0).contains(&search.size_tolerance) {
        return Err(ConfigError::ValidationError(format!(
            "search.size_tolerance must be in [0, 1), got {}",
            search.size_tolerance
        )));
    }

    let overrides = [
        ("sources.piratebay", &config.sources.piratebay.base_url),
        ("sources.x1337", &config.sources.x1337.base_url),
        ("sources.rarbg", &config.sources.rarbg.base_url),
        ("sources.audiostorrent", &config.sources.audiostorrent.base_url),
    ];
    for (field, base_url) in overrides {
        if let Some(base_url) = base_url {
            check_url(&format!("{}.base_url", field), base_url)?;
        }
    }

    let mut names: HashMap<&str, &str> = HashMap::new();
    for (key, site) in config.sites.iter().filter(|(_, s)| s.enabled) {
        validate_site(key, site)?;
        if let Some(other) = names.insert(site.display_name(key), key) {
            return Err(ConfigError::ValidationError(format!(
                "sites.{}: name '{}' is already used by sites.{}",
                key,
                site.display_name(key),
                other
            )));
        }
    }

    for name in &search.source_priority {
        let known = match SourceTag::parse(name) {
            SourceTag::Custom(custom) => config
                .sites
                .iter()
                .any(|(key, site)| site.display_name(key) == custom),
            _ => true,
        };
        if !known {
            return Err(ConfigError::ValidationError(format!(
                "search.source_priority: unknown source '{}'",
                name
            )));
        }
    }

    Ok(())
}

/// Validate a single selector-driven site definition.
pub(crate) fn validate_site(key: &str, site: &SiteConfig) -> Result<(), ConfigError> {
    let name = site.display_name(key);
    if !matches!(SourceTag::parse(name), SourceTag::Custom(_)) {
        return Err(ConfigError::ValidationError(format!(
            "sites.{}: name '{}' is reserved for a built-in source",
            key, name
        )));
    }

    check_url(&format!("sites.{}.base_url", key), &site.base_url)?;

    if !site.search.url_template.contains("{query}") {
        return Err(ConfigError::ValidationError(format!(
            "sites.{}.search.url_template must contain {{query}}",
            key
        )));
    }
    if !site.search.method.eq_ignore_ascii_case("GET") {
        return Err(ConfigError::ValidationError(format!(
            "sites.{}.search.method '{}' is not supported (only GET)",
            key, site.search.method
        )));
    }

    let selectors = &site.selectors;
    let required = [
        ("result_item", Some(&selectors.result_item)),
        ("title", Some(&selectors.title)),
        ("magnet", Some(&selectors.magnet)),
        ("title_link", selectors.title_link.as_ref()),
        ("size", selectors.size.as_ref()),
        ("seeders", selectors.seeders.as_ref()),
        ("leechers", selectors.leechers.as_ref()),
    ];
    for (field, css) in required {
        if let Some(css) = css {
            parse_selector(&format!("sites.{}.selectors.{}", key, field), css)?;
        }
    }

    regex_lite::Regex::new(&site.patterns.size_regex).map_err(|e| {
        ConfigError::ValidationError(format!("sites.{}.patterns.size_regex: {}", key, e))
    })?;

    Ok(())
}

pub(crate) fn parse_selector(field: &str, css: &str) -> Result<Selector, ConfigError> {
    Selector::parse(css)
        .map_err(|e| ConfigError::ValidationError(format!("{}: invalid selector '{}': {:?}", field, css, e)))
}

fn check_url(field: &str, value: &str) -> Result<(), ConfigError> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|e| ConfigError::ValidationError(format!("{}: invalid URL '{}': {}", field, value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    const VALID_SITE: &str = r#"
[sites.example]
base_url = "https://example.org"

[sites.example.search]
url_template = "{base_url}/?s={query}"

[sites.example.selectors]
result_item = "article"
title = "h2 a"
"#;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_valid_site() {
        let config = load_config_from_str(VALID_SITE).unwrap();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_timeout_zero_fails() {
        let mut config = Config::default();
        config.search.timeout_secs = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_tolerance_out_of_range_fails() {
        let mut config = Config::default();
        config.search.size_tolerance = 1.5;
        assert!(validate_config(&config).is_err());

        config.search.size_tolerance = -0.1;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_bad_base_url_override_fails() {
        let mut config = Config::default();
        config.sources.x1337.base_url = Some("not a url".to_string());
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("sources.x1337.base_url"));
    }

    #[test]
    fn test_validate_template_without_query_fails() {
        let mut config = load_config_from_str(VALID_SITE).unwrap();
        config.sites.get_mut("example").unwrap().search.url_template =
            "{base_url}/latest".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("{query}"));
    }

    #[test]
    fn test_validate_bad_selector_fails() {
        let mut config = load_config_from_str(VALID_SITE).unwrap();
        config.sites.get_mut("example").unwrap().selectors.seeders = Some("td[[".to_string());
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("selectors.seeders"));
    }

    #[test]
    fn test_validate_bad_size_regex_fails() {
        let mut config = load_config_from_str(VALID_SITE).unwrap();
        config.sites.get_mut("example").unwrap().patterns.size_regex = "(unclosed".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_post_method_fails() {
        let mut config = load_config_from_str(VALID_SITE).unwrap();
        config.sites.get_mut("example").unwrap().search.method = "POST".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_reserved_name_fails() {
        let mut config = load_config_from_str(VALID_SITE).unwrap();
        config.sites.get_mut("example").unwrap().name = Some("tpb".to_string());
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("reserved"));
    }

    #[test]
    fn test_validate_duplicate_site_name_fails() {
        let toml = format!(
            "{}{}",
            VALID_SITE,
            r#"
[sites.mirror]
name = "example"
base_url = "https://mirror.example.org"

[sites.mirror.search]
url_template = "{base_url}/?s={query}"

[sites.mirror.selectors]
result_item = "article"
title = "h2 a"
"#
        );
        let mut config = load_config_from_str(&toml).unwrap();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("already used by sites.example"));

        // Only enabled sites build sources, so a disabled twin is fine
        config.sites.get_mut("mirror").unwrap().enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_unknown_priority_source_fails() {
        let mut config = Config::default();
        config.search.source_priority = vec!["TPB".to_string(), "Nowhere".to_string()];
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("Nowhere"));
    }

    #[test]
    fn test_validate_priority_may_name_sites() {
        let mut config = load_config_from_str(VALID_SITE).unwrap();
        config.search.source_priority = vec!["example".to_string(), "1337x".to_string()];
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_skips_disabled_sites() {
        let mut config = load_config_from_str(VALID_SITE).unwrap();
        let site = config.sites.get_mut("example").unwrap();
        site.enabled = false;
        site.selectors.title = "h2[[".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
