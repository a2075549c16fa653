//! Building the enabled sources from configuration.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::config::{Config, ConfigError};

use super::sources::{
    defaults, AudiostorrentSource, DynamicSource, PirateBaySource, RarbgSource, Source,
    X1337Source,
};
use super::{SourceInfo, SourceTag};

/// Create every enabled source, built-ins first, then configured sites in
/// key order. All sources share `client`.
pub fn build_sources(config: &Config, client: Client) -> Result<Vec<Arc<dyn Source>>, ConfigError> {
    let builtin = &config.sources;
    let mut sources: Vec<Arc<dyn Source>> = Vec::new();

    if builtin.piratebay.enabled {
        sources.push(Arc::new(PirateBaySource::new(
            client.clone(),
            builtin.piratebay.base_url.clone(),
        )));
    }
    if builtin.x1337.enabled {
        sources.push(Arc::new(X1337Source::new(
            client.clone(),
            builtin.x1337.base_url.clone(),
        )));
    }
    if builtin.rarbg.enabled {
        sources.push(Arc::new(RarbgSource::new(
            client.clone(),
            builtin.rarbg.base_url.clone(),
            builtin.rarbg.app_id.clone(),
            Duration::from_millis(builtin.rarbg.token_delay_ms),
        )));
    }
    if builtin.audiostorrent.enabled {
        sources.push(Arc::new(AudiostorrentSource::new(
            client.clone(),
            builtin.audiostorrent.base_url.clone(),
        )));
    }

    for (key, site) in config.sites.iter().filter(|(_, s)| s.enabled) {
        sources.push(Arc::new(DynamicSource::new(client.clone(), key, site)?));
    }

    Ok(sources)
}

/// Every known source, enabled or not, in dispatch order.
pub fn list_sources(config: &Config) -> Vec<SourceInfo> {
    let builtin = &config.sources;
    let info = |tag, base_url: &Option<String>, default: &str, enabled| SourceInfo {
        tag,
        base_url: base_url.clone().unwrap_or_else(|| default.to_string()),
        enabled,
    };

    let mut list = vec![
        info(
            SourceTag::ThePirateBay,
            &builtin.piratebay.base_url,
            defaults::PIRATEBAY,
            builtin.piratebay.enabled,
        ),
        info(
            SourceTag::X1337,
            &builtin.x1337.base_url,
            defaults::X1337,
            builtin.x1337.enabled,
        ),
        info(
            SourceTag::Rarbg,
            &builtin.rarbg.base_url,
            defaults::RARBG,
            builtin.rarbg.enabled,
        ),
        info(
            SourceTag::Audiostorrent,
            &builtin.audiostorrent.base_url,
            defaults::AUDIOSTORRENT,
            builtin.audiostorrent.enabled,
        ),
    ];

    list.extend(config.sites.iter().map(|(key, site)| SourceInfo {
        tag: SourceTag::Custom(site.display_name(key).to_string()),
        base_url: site.base_url.clone(),
        enabled: site.enabled,
    }));

    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    const WITH_SITE: &str = r#"
[sources.rarbg]
enabled = false

[sources.x1337]
base_url = "https://1337x.example"

[sites.mirror]
name = "Mirror"
base_url = "https://mirror.example"

[sites.mirror.search]
url_template = "{base_url}/find?q={query}"

[sites.mirror.selectors]
result_item = "li.result"
title = "a.title"
"#;

    fn tags(sources: &[Arc<dyn Source>]) -> Vec<SourceTag> {
        sources.iter().map(|s| s.tag()).collect()
    }

    #[test]
    fn test_build_default_sources() {
        let sources = build_sources(&Config::default(), Client::new()).unwrap();
        assert_eq!(
            tags(&sources),
            vec![SourceTag::ThePirateBay, SourceTag::X1337, SourceTag::Rarbg]
        );
    }

    #[test]
    fn test_build_sources_with_site_and_overrides() {
        let config = load_config_from_str(WITH_SITE).unwrap();
        let sources = build_sources(&config, Client::new()).unwrap();

        assert_eq!(
            tags(&sources),
            vec![
                SourceTag::ThePirateBay,
                SourceTag::X1337,
                SourceTag::Custom("Mirror".to_string())
            ]
        );
        assert_eq!(sources[1].base_url(), "https://1337x.example");
        assert_eq!(sources[2].base_url(), "https://mirror.example");
    }

    #[test]
    fn test_build_sources_all_disabled() {
        let config = load_config_from_str(
            r#"
[sources.piratebay]
enabled = false
[sources.x1337]
enabled = false
[sources.rarbg]
enabled = false
"#,
        )
        .unwrap();
        assert!(build_sources(&config, Client::new()).unwrap().is_empty());
    }

    #[test]
    fn test_list_sources_includes_disabled() {
        let config = load_config_from_str(WITH_SITE).unwrap();
        let list = list_sources(&config);

        assert_eq!(list.len(), 5);
        assert_eq!(list[0].base_url, "https://apibay.org");
        assert_eq!(list[1].base_url, "https://1337x.example");
        assert!(!list[2].enabled);
        assert_eq!(list[3].tag, SourceTag::Audiostorrent);
        assert!(!list[3].enabled);
        assert_eq!(list[4].tag, SourceTag::Custom("Mirror".to_string()));
        assert!(list[4].enabled);
    }
}
