pub mod config;
pub mod metrics;
pub mod searcher;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError, SiteConfig,
};
pub use searcher::{
    SearchDiagnostics, SearchError, SearchOutcome, SearchPolicy, SearchQuery, SearchUpdate,
    Searcher, SortKey, SourceInfo, SourceTag, TorrentRecord, TorrentSearcher,
};
