//! SKU recovery from product URLs.
//!
//! Detail-page paths carry the SKU as the segment after `/p/`
//! (`/p/mp002xw0zg9n/clothes-terranova-bryuki/`). When no qualifying
//! segment exists the SKU is derived from a hash of the URL, so the same
//! URL always maps to the same identifier.

use sha2::{Digest, Sha256};

/// Derive a SKU for a product URL, falling back to a URL hash.
#[must_use]
pub(crate) fn synthesize_sku(url: &str) -> String {
    sku_from_path(url).unwrap_or_else(|| hashed_sku(url))
}

/// Pull a SKU out of the URL path: the segment following `/p/` when it
/// qualifies, otherwise the first qualifying segment anywhere in the path.
pub(crate) fn sku_from_path(url: &str) -> Option<String> {
    let without_query = url.split('?').next().unwrap_or(url);
    let path = url_path(without_query);
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if let Some(pos) = segments.iter().position(|s| *s == "p") {
        if let Some(seg) = segments.get(pos + 1) {
            if qualifies(seg) {
                return Some(seg.to_uppercase());
            }
        }
    }
    segments
        .iter()
        .find(|s| qualifies(s))
        .map(|s| s.to_uppercase())
}

/// A SKU-looking segment: at least 8 characters, alphanumeric ignoring
/// dashes.
fn qualifies(segment: &str) -> bool {
    let compact: String = segment.chars().filter(|&c| c != '-').collect();
    segment.len() >= 8 && !compact.is_empty() && compact.chars().all(|c| c.is_ascii_alphanumeric())
}

fn url_path(url: &str) -> &str {
    let after_scheme = url.find("://").map_or(url, |i| &url[i + 3..]);
    after_scheme.find('/').map_or("", |i| &after_scheme[i..])
}

fn hashed_sku(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let hex: String = digest.iter().take(4).map(|b| format!("{b:02X}")).collect();
    format!("LMD{hex}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sku_comes_from_segment_after_product_marker() {
        let sku = synthesize_sku("https://www.lamoda.kz/p/mp002xw0zg9n/clothes-bryuki/");
        assert_eq!(sku, "MP002XW0ZG9N");
    }

    #[test]
    fn query_string_is_ignored() {
        let sku = synthesize_sku("https://www.lamoda.ru/p/he002emabcd1/?sku=x");
        assert_eq!(sku, "HE002EMABCD1");
    }

    #[test]
    fn short_marker_segment_falls_back_to_other_segments() {
        let sku = synthesize_sku("https://www.lamoda.kz/p/abc/rtlaek537801-item/");
        assert_eq!(sku, "RTLAEK537801-ITEM");
    }

    #[test]
    fn unrecoverable_path_hashes_deterministically() {
        let a = synthesize_sku("https://www.lamoda.kz/catalog/");
        let b = synthesize_sku("https://www.lamoda.kz/catalog/");
        assert_eq!(a, b);
        assert!(a.starts_with("LMD"));
        assert_eq!(a.len(), 11);
    }

    #[test]
    fn distinct_urls_hash_to_distinct_skus() {
        let a = synthesize_sku("https://www.lamoda.kz/a/");
        let b = synthesize_sku("https://www.lamoda.kz/b/");
        assert_ne!(a, b);
    }
}
