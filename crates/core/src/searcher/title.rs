//! Title cleanup and the normalized key used for deduplication.

use once_cell::sync::Lazy;
use regex_lite::Regex;

/// Seed/leech markup some sites append to titles, e.g. "[S: 12 L: 3]",
/// "(S:12/L:3)" or "Seeders: 12 Leechers: 3".
///
/// Every pattern needs a seed or leech label. A bare "(2019/2020)" or
/// "(1/2)" is a season or part marker and stays in the title.
static TRAILING_DECORATION: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\s*\[\s*S(?:eeds?|eeders)?\s*:?\s*\d+\s*[/|,]?\s*L(?:eechers)?\s*:?\s*\d+\s*\]$",
        r"(?i)\s*\(\s*S(?:eeds?|eeders)?\s*:?\s*\d+\s*[/|,]?\s*L(?:eechers)?\s*:?\s*\d+\s*\)$",
        r"(?i)\s*[-|]?\s*\b(?:seeders|seeds|leechers|peers)\s*:\s*\d+(?:\s*[,/|]?\s*(?:seeders|seeds|leechers|peers)\s*:\s*\d+)*$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("decoration pattern is valid"))
    .collect()
});

/// Normalize a scraped title for display.
///
/// Collapses whitespace and strips trailing seed/leech decoration, keeping
/// everything else (year, resolution, codec tags).
pub fn clean_title(raw: &str) -> String {
    let mut title = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    loop {
        let before = title.len();
        for pattern in TRAILING_DECORATION.iter() {
            title = pattern.replace(&title, "").into_owned();
        }
        if title.len() == before {
            break;
        }
    }
    title.trim().to_string()
}

/// Key under which two titles count as the same torrent.
///
/// Case-insensitive, decoration-stripped, with punctuation and separators
/// (dots, underscores, brackets, dashes) folded into single spaces.
pub fn dedup_key(title: &str) -> String {
    let cleaned = clean_title(title).to_lowercase();
    let folded: String = cleaned
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
