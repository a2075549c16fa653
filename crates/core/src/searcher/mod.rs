//! Torrent search across several indexing sites.
//!
//! Each site is a [`sources::Source`]. The [`TorrentSearcher`] fans one query
//! out to every enabled source concurrently, bounds each with a timeout, and
//! merges what comes back into a single deduplicated, ranked list.

mod aggregator;
mod dedup;
mod executor;
mod http;
mod magnet;
mod registry;
mod size;
pub mod sources;
mod title;
mod torrent_searcher;
mod types;

pub use aggregator::{aggregate, sort_records};
pub use dedup::{deduplicate, DedupPolicy, DEFAULT_SIZE_TOLERANCE};
pub use executor::{dispatch, dispatch_streaming, run_with_timeout};
pub use http::build_client;
pub use magnet::{is_magnet, magnet_from_hash, with_trackers, TRACKERS};
pub use registry::{build_sources, list_sources};
pub use size::{format_size, parse_size, sizes_within_tolerance};
pub use title::{clean_title, dedup_key};
pub use torrent_searcher::{SearchPolicy, TorrentSearcher};
pub use types::*;
