//! Merging per-source outcomes into one ranked list.

use std::cmp::Ordering;

use super::dedup::{deduplicate, DedupPolicy};
use super::{RankedList, SearchDiagnostics, SortKey, SourceResult, TorrentRecord};

/// Merge source outcomes into a ranked list.
///
/// Successful record lists are concatenated in source order, deduplicated,
/// stable-sorted by `sort` and truncated to `limit`. Failures only show up
/// in the returned diagnostics.
pub fn aggregate(
    results: &[SourceResult],
    sort: SortKey,
    limit: usize,
    policy: &DedupPolicy,
) -> (RankedList, SearchDiagnostics) {
    let merged: Vec<TorrentRecord> = results
        .iter()
        .filter_map(|r| r.outcome.as_ref().ok())
        .flatten()
        .cloned()
        .collect();

    let mut records = deduplicate(merged, policy);
    sort_records(&mut records, sort);
    records.truncate(limit);

    (records, SearchDiagnostics::from_results(results))
}

/// Stable sort, so equal records keep their merged order.
pub fn sort_records(records: &mut [TorrentRecord], sort: SortKey) {
    records.sort_by(|a, b| compare(a, b, sort));
}

fn compare(a: &TorrentRecord, b: &TorrentRecord, sort: SortKey) -> Ordering {
    match sort {
        SortKey::Seeders => b.seeders.cmp(&a.seeders),
        SortKey::Size => b.size_bytes.cmp(&a.size_bytes),
        SortKey::Name => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
    }
}
