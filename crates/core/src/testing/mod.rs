//! Testing utilities and a mock source for exercising the search pipeline
//! without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use turok_core::testing::{MockSource, fixtures};
//!
//! let slow = MockSource::new(SourceTag::Rarbg).with_delay(Duration::from_secs(30));
//! let fast = MockSource::new(SourceTag::ThePirateBay)
//!     .with_records(vec![fixtures::record("Ubuntu 24.04", SourceTag::ThePirateBay, 120)]);
//! ```

mod mock_source;

pub use mock_source::MockSource;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::searcher::{SourceTag, TorrentRecord};

    /// Create a test record with a 100 MiB size and the given seeders.
    pub fn record(title: &str, source: SourceTag, seeders: u32) -> TorrentRecord {
        sized_record(title, source, 1024 * 1024 * 100, seeders)
    }

    /// Create a test record with an explicit size.
    pub fn sized_record(title: &str, source: SourceTag, size_bytes: u64, seeders: u32) -> TorrentRecord {
        TorrentRecord {
            size_bytes,
            seeders,
            leechers: seeders / 10,
            ..TorrentRecord::new(title, source)
        }
    }

    /// Create a test record carrying a magnet built from `info_hash`.
    pub fn magnet_record(title: &str, source: SourceTag, info_hash: &str) -> TorrentRecord {
        TorrentRecord {
            magnet_uri: Some(format!("magnet:?xt=urn:btih:{}", info_hash)),
            ..record(title, source, 50)
        }
    }
}
