//! Deduplication of search results gathered from several sources.
//!
//! Different sites list the same torrent under slightly different titles and
//! rounded sizes, so records are matched on a normalized title plus a size
//! tolerance rather than on exact equality.

use super::size::sizes_within_tolerance;
use super::title::dedup_key;
use super::{SourceTag, TorrentRecord};

/// Default relative size difference under which two records match.
pub const DEFAULT_SIZE_TOLERANCE: f64 = 0.05;

/// Rules for deciding which records are duplicates and which one survives.
#[derive(Debug, Clone, PartialEq)]
pub struct DedupPolicy {
    /// Maximum relative size difference, against the larger size.
    pub size_tolerance: f64,
    /// Tie-break order when duplicates have equal seeders. Sources not
    /// listed rank after every listed one.
    pub source_priority: Vec<SourceTag>,
}

impl Default for DedupPolicy {
    fn default() -> Self {
        Self {
            size_tolerance: DEFAULT_SIZE_TOLERANCE,
            source_priority: vec![
                SourceTag::ThePirateBay,
                SourceTag::X1337,
                SourceTag::Rarbg,
                SourceTag::Audiostorrent,
            ],
        }
    }
}

impl DedupPolicy {
    /// Build a policy from configured source names.
    pub fn from_names(size_tolerance: f64, names: &[String]) -> Self {
        Self {
            size_tolerance,
            source_priority: names.iter().map(|n| SourceTag::parse(n)).collect(),
        }
    }

    fn rank(&self, tag: &SourceTag) -> usize {
        self.source_priority
            .iter()
            .position(|t| t == tag)
            .unwrap_or(self.source_priority.len())
    }

    /// Whether `candidate` should replace `current` as a group's survivor.
    fn prefers(&self, candidate: &TorrentRecord, current: &TorrentRecord) -> bool {
        candidate.seeders > current.seeders
            || (candidate.seeders == current.seeders
                && self.rank(&candidate.source) < self.rank(&current.source))
    }
}

/// One set of duplicates: the size of every record merged into it, and the
/// record currently chosen to represent it.
struct Group {
    key: String,
    sizes: Vec<u64>,
    survivor: TorrentRecord,
}

impl Group {
    fn matches(&self, key: &str, size_bytes: u64, tolerance: f64) -> bool {
        self.key == key
            && self
                .sizes
                .iter()
                .any(|&size| sizes_within_tolerance(size, size_bytes, tolerance))
    }

    fn absorb(&mut self, other: Group, policy: &DedupPolicy) {
        self.sizes.extend(other.sizes);
        if policy.prefers(&other.survivor, &self.survivor) {
            self.survivor = other.survivor;
        }
    }
}

/// Collapse duplicate records into one survivor each.
///
/// Two records are duplicates when their [`dedup_key`]s are equal and their
/// sizes are within `policy.size_tolerance`. Matching is transitive: a record
/// within tolerance of any member joins the group, and a record that matches
/// several groups merges them, so the outcome does not depend on arrival
/// order. The survivor has the most seeders, then the best source priority,
/// then was seen first. Each survivor takes the position of its group's
/// first-seen record.
pub fn deduplicate(records: Vec<TorrentRecord>, policy: &DedupPolicy) -> Vec<TorrentRecord> {
    let mut groups: Vec<Group> = Vec::with_capacity(records.len());

    for record in records {
        let key = dedup_key(&record.title);
        let matching: Vec<usize> = groups
            .iter()
            .enumerate()
            .filter(|(_, g)| g.matches(&key, record.size_bytes, policy.size_tolerance))
            .map(|(i, _)| i)
            .collect();

        let Some((&first, rest)) = matching.split_first() else {
            groups.push(Group {
                key,
                sizes: vec![record.size_bytes],
                survivor: record,
            });
            continue;
        };

        // Back to front so the remaining indices stay valid
        for &i in rest.iter().rev() {
            let bridged = groups.remove(i);
            groups[first].absorb(bridged, policy);
        }
        let group = &mut groups[first];
        group.sizes.push(record.size_bytes);
        if policy.prefers(&record, &group.survivor) {
            group.survivor = record;
        }
    }

    groups.into_iter().map(|g| g.survivor).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(title: &str, source: SourceTag, size_bytes: u64, seeders: u32) -> TorrentRecord {
        TorrentRecord {
            size_bytes,
            seeders,
            ..TorrentRecord::new(title, source)
        }
    }

    #[test]
    fn test_dedup_single_record() {
        let records = vec![make_record("Test", SourceTag::ThePirateBay, 1000, 10)];
        let result = deduplicate(records, &DedupPolicy::default());

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "Test");
    }

    #[test]
    fn test_dedup_ubuntu_example() {
        let records = vec![
            make_record("Ubuntu 24.04", SourceTag::ThePirateBay, 4_200_000_000, 1523),
            make_record("ubuntu 24.04", SourceTag::X1337, 4_180_000_000, 892),
        ];
        let result = deduplicate(records, &DedupPolicy::default());

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].source, SourceTag::ThePirateBay);
        assert_eq!(result[0].seeders, 1523);
    }

    #[test]
    fn test_dedup_keeps_higher_seeders_regardless_of_order() {
        let records = vec![
            make_record("Ubuntu.24.04", SourceTag::X1337, 1000, 5),
            make_record("Ubuntu 24.04", SourceTag::ThePirateBay, 1000, 50),
        ];
        let result = deduplicate(records, &DedupPolicy::default());

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].seeders, 50);
        // The survivor keeps its own title
        assert_eq!(result[0].title, "Ubuntu 24.04");
    }

    #[test]
    fn test_dedup_size_outside_tolerance_kept_apart() {
        let records = vec![
            make_record("Ubuntu 24.04", SourceTag::ThePirateBay, 4_200_000_000, 10),
            make_record("Ubuntu 24.04", SourceTag::X1337, 2_100_000_000, 20),
        ];
        let result = deduplicate(records, &DedupPolicy::default());

        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_dedup_different_titles_kept_apart() {
        let records = vec![
            make_record("Ubuntu 24.04", SourceTag::ThePirateBay, 1000, 10),
            make_record("Ubuntu 22.04", SourceTag::ThePirateBay, 1000, 10),
        ];
        assert_eq!(deduplicate(records, &DedupPolicy::default()).len(), 2);
    }

    #[test]
    fn test_dedup_zero_sizes_match() {
        let records = vec![
            make_record("Drum Kit", SourceTag::Audiostorrent, 0, 0),
            make_record("Drum Kit", SourceTag::Custom("Mirror".into()), 0, 0),
        ];
        let result = deduplicate(records, &DedupPolicy::default());

        assert_eq!(result.len(), 1);
        // Listed source beats unlisted one on a seeder tie
        assert_eq!(result[0].source, SourceTag::Audiostorrent);
    }

    #[test]
    fn test_dedup_tie_broken_by_priority() {
        let records = vec![
            make_record("Fedora 40", SourceTag::Rarbg, 1000, 10),
            make_record("Fedora 40", SourceTag::X1337, 1000, 10),
            make_record("Fedora 40", SourceTag::ThePirateBay, 1000, 10),
        ];
        let result = deduplicate(records, &DedupPolicy::default());
        assert_eq!(result[0].source, SourceTag::ThePirateBay);

        let policy = DedupPolicy::from_names(0.05, &["RARBG".to_string(), "TPB".to_string()]);
        let records = vec![
            make_record("Fedora 40", SourceTag::ThePirateBay, 1000, 10),
            make_record("Fedora 40", SourceTag::Rarbg, 1000, 10),
        ];
        assert_eq!(deduplicate(records, &policy)[0].source, SourceTag::Rarbg);
    }

    #[test]
    fn test_dedup_full_tie_keeps_first_seen() {
        let mut first = make_record("Fedora 40", SourceTag::ThePirateBay, 1000, 10);
        first.details_url = Some("first".to_string());
        let mut second = make_record("Fedora 40", SourceTag::ThePirateBay, 1000, 10);
        second.details_url = Some("second".to_string());

        let result = deduplicate(vec![first, second], &DedupPolicy::default());
        assert_eq!(result[0].details_url.as_deref(), Some("first"));
    }

    #[test]
    fn test_dedup_survivor_takes_first_position() {
        let records = vec![
            make_record("Alpha", SourceTag::X1337, 1000, 1),
            make_record("Beta", SourceTag::X1337, 1000, 2),
            make_record("Alpha", SourceTag::ThePirateBay, 1000, 99),
        ];
        let result = deduplicate(records, &DedupPolicy::default());

        let titles: Vec<_> = result.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Beta"]);
        assert_eq!(result[0].seeders, 99);
    }

    #[test]
    fn test_dedup_chain_within_tolerance_collapses() {
        let records = vec![
            make_record("Ubuntu 24.04", SourceTag::ThePirateBay, 100_000, 1),
            make_record("Ubuntu 24.04", SourceTag::X1337, 96_000, 50),
            make_record("Ubuntu 24.04", SourceTag::Rarbg, 92_000, 10),
        ];
        let result = deduplicate(records, &DedupPolicy::default());

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].size_bytes, 96_000);
        assert_eq!(result[0].seeders, 50);
    }

    #[test]
    fn test_dedup_chain_independent_of_order() {
        let policy = DedupPolicy::default();
        // 100_000 and 92_000 are 8% apart, so they start as separate groups
        // until 96_000 bridges them
        let records = vec![
            make_record("Ubuntu 24.04", SourceTag::ThePirateBay, 100_000, 1),
            make_record("Ubuntu 24.04", SourceTag::Rarbg, 92_000, 10),
            make_record("Other", SourceTag::Rarbg, 500, 3),
            make_record("Ubuntu 24.04", SourceTag::X1337, 96_000, 50),
        ];
        let result = deduplicate(records, &policy);

        let titles: Vec<_> = result.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Ubuntu 24.04", "Other"]);
        assert_eq!(result[0].seeders, 50);

        let reversed = vec![
            make_record("Ubuntu 24.04", SourceTag::X1337, 96_000, 50),
            make_record("Ubuntu 24.04", SourceTag::Rarbg, 92_000, 10),
            make_record("Ubuntu 24.04", SourceTag::ThePirateBay, 100_000, 1),
        ];
        let result = deduplicate(reversed, &policy);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].seeders, 50);
    }

    #[test]
    fn test_dedup_keeps_numbered_parts_apart() {
        let records = vec![
            make_record("Live Album (1/2)", SourceTag::Audiostorrent, 1000, 4),
            make_record("Live Album (2/2)", SourceTag::Audiostorrent, 1000, 4),
        ];
        assert_eq!(deduplicate(records, &DedupPolicy::default()).len(), 2);
    }

    #[test]
    fn test_dedup_empty() {
        assert!(deduplicate(Vec::new(), &DedupPolicy::default()).is_empty());
    }
}
