//! Human-readable size parsing and formatting.
//!
//! Units are binary throughout: "KB" and "KiB" both mean 1024 bytes, which
//! matches how the indexers label their sizes.

use once_cell::sync::Lazy;
use regex_lite::Regex;

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

static SIZE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9][0-9,]*(?:\.[0-9]+)?|\.[0-9]+)\s*(KIB|MIB|GIB|TIB|KB|MB|GB|TB|B)")
        .expect("size pattern is valid")
});

/// Parse a size such as "1.9 GB", "700MB" or "1.5 GiB" into bytes.
///
/// Only a leading size is considered; trailing text ("1.9 GB1523" as
/// scraped from a table cell) is ignored. Anything unparsable yields 0.
pub fn parse_size(text: &str) -> u64 {
    let upper = text.trim().to_ascii_uppercase();
    let Some(caps) = SIZE_PATTERN.captures(&upper) else {
        return 0;
    };

    let value: f64 = match caps[1].replace(',', "").parse() {
        Ok(v) => v,
        Err(_) => return 0,
    };
    let exponent = match &caps[2] {
        "B" => 0,
        "KB" | "KIB" => 1,
        "MB" | "MIB" => 2,
        "GB" | "GIB" => 3,
        _ => 4,
    };

    (value * 1024f64.powi(exponent)) as u64
}

/// Format a byte count with one decimal ("1.5 GB").
pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    for unit in UNITS {
        if value < 1024.0 {
            return format!("{:.1} {}", value, unit);
        }
        value /= 1024.0;
    }
    format!("{:.1} PB", value)
}

/// Whether two sizes differ by at most `tolerance`, relative to the larger.
pub fn sizes_within_tolerance(a: u64, b: u64, tolerance: f64) -> bool {
    let (larger, smaller) = if a >= b { (a, b) } else { (b, a) };
    if larger == 0 {
        return true;
    }
    (larger - smaller) as f64 / larger as f64 <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size_units() {
        assert_eq!(parse_size("12 B"), 12);
        assert_eq!(parse_size("1 KB"), 1024);
        assert_eq!(parse_size("700 MB"), 700 * 1024 * 1024);
        assert_eq!(parse_size("2 GB"), 2 * 1024 * 1024 * 1024);
        assert_eq!(parse_size("1 TB"), 1024u64.pow(4));
    }

    #[test]
    fn test_parse_size_binary_suffixes_match_plain() {
        assert_eq!(parse_size("1.5 GiB"), parse_size("1.5 GB"));
        assert_eq!(parse_size("3 MiB"), parse_size("3 MB"));
    }

    #[test]
    fn test_parse_size_fractional_and_compact() {
        assert_eq!(parse_size("1.9 GB"), (1.9 * 1024f64.powi(3)) as u64);
        assert_eq!(parse_size("700MB"), 700 * 1024 * 1024);
        assert_eq!(parse_size("  4.5 gb "), (4.5 * 1024f64.powi(3)) as u64);
    }

    #[test]
    fn test_parse_size_thousands_separator() {
        assert_eq!(parse_size("1,024 MB"), 1024 * 1024 * 1024);
    }

    #[test]
    fn test_parse_size_ignores_trailing_text() {
        // 1337x renders the seeder count right after the size
        assert_eq!(parse_size("1.9 GB1523"), parse_size("1.9 GB"));
    }

    #[test]
    fn test_parse_size_invalid_is_zero() {
        assert_eq!(parse_size(""), 0);
        assert_eq!(parse_size("unknown"), 0);
        assert_eq!(parse_size("GB 12"), 0);
        assert_eq!(parse_size("12 parsecs"), 0);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0.0 B");
        assert_eq!(format_size(512), "512.0 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(700 * 1024 * 1024), "700.0 MB");
        assert_eq!(format_size(3 * 1024u64.pow(5)), "3.0 PB");
    }

    #[test]
    fn test_sizes_within_tolerance() {
        assert!(sizes_within_tolerance(4_200_000_000, 4_180_000_000, 0.05));
        assert!(sizes_within_tolerance(100, 95, 0.05));
        assert!(!sizes_within_tolerance(100, 94, 0.05));
        assert!(sizes_within_tolerance(0, 0, 0.05));
        assert!(!sizes_within_tolerance(0, 10, 0.05));
        assert!(sizes_within_tolerance(10, 10, 0.0));
    }
}
