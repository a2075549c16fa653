//! Magnet URI helpers.

/// Public trackers appended to magnets that carry none, so clients can
/// find peers for the metadata quickly.
pub const TRACKERS: [&str; 8] = [
    "udp://tracker.opentrackr.org:1337/announce",
    "udp://open.stealth.si:80/announce",
    "udp://tracker.torrent.eu.org:451/announce",
    "udp://tracker.bittor.pw:1337/announce",
    "udp://public.popcorn-tracker.org:6969/announce",
    "udp://tracker.dler.org:6969/announce",
    "udp://exodus.desync.com:6969/announce",
    "udp://open.demonii.com:1337/announce",
];

/// Build a magnet URI from an info hash and display name.
pub fn magnet_from_hash(info_hash: &str, name: &str) -> String {
    format!(
        "magnet:?xt=urn:btih:{}&dn={}",
        info_hash,
        urlencoding::encode(name)
    )
}

/// Append [`TRACKERS`] to a magnet that has no `tr` parameter.
///
/// Magnets that already list a tracker are returned unchanged.
pub fn with_trackers(magnet: &str) -> String {
    if magnet.is_empty() || magnet.contains("&tr=") || magnet.contains("?tr=") {
        return magnet.to_string();
    }
    let mut out = magnet.to_string();
    for tracker in TRACKERS {
        out.push_str("&tr=");
        out.push_str(&urlencoding::encode(tracker));
    }
    out
}

/// Whether a link is a magnet URI.
pub fn is_magnet(link: &str) -> bool {
    link.trim_start().starts_with("magnet:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnet_from_hash_encodes_name() {
        let magnet = magnet_from_hash("ABC123", "Ubuntu 24.04 & more");
        assert_eq!(magnet, "magnet:?xt=urn:btih:ABC123&dn=Ubuntu%2024.04%20%26%20more");
    }

    #[test]
    fn test_with_trackers_appends_all() {
        let magnet = with_trackers("magnet:?xt=urn:btih:abc");
        assert_eq!(magnet.matches("&tr=").count(), TRACKERS.len());
        assert!(magnet.contains("udp%3A%2F%2Ftracker.opentrackr.org%3A1337%2Fannounce"));
    }

    #[test]
    fn test_with_trackers_keeps_existing() {
        let magnet = "magnet:?xt=urn:btih:abc&tr=udp%3A%2F%2Fexample.org%3A80";
        assert_eq!(with_trackers(magnet), magnet);
    }

    #[test]
    fn test_with_trackers_empty() {
        assert_eq!(with_trackers(""), "");
    }

    #[test]
    fn test_is_magnet() {
        assert!(is_magnet("magnet:?xt=urn:btih:abc"));
        assert!(!is_magnet("https://1337x.to/torrent/1/x/"));
    }
}
