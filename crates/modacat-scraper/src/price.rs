//! Localized price parsing.
//!
//! Storefront prices are whole native currency units with a single space as
//! the thousands separator (`"15 990 ₸"`). Anything outside the plausibility
//! band is treated as extraction noise (page chrome, SKUs, view counters)
//! and skipped in favor of later matches in the same text.

use regex::Regex;

/// Lower bound of the plausibility band, in native currency units.
pub const MIN_PLAUSIBLE_PRICE: f64 = 100.0;

/// Upper bound of the plausibility band, in native currency units.
pub const MAX_PLAUSIBLE_PRICE: f64 = 10_000_000.0;

/// Whether `value` lies within the plausibility band.
#[must_use]
pub fn is_plausible(value: f64) -> bool {
    (MIN_PLAUSIBLE_PRICE..=MAX_PLAUSIBLE_PRICE).contains(&value)
}

/// Parse a price from element text.
///
/// Strips HTML tags and currency glyphs, then tries the space-grouped
/// pattern (`15 990`) and falls back to bare 3–7 digit runs. The first
/// in-band candidate wins; out-of-band candidates are skipped rather than
/// failing the whole parse.
#[must_use]
pub fn parse_price(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }

    let tag_re = Regex::new(r"<[^>]+>").expect("valid regex");
    let stripped = tag_re.replace_all(text, "");
    let clean = stripped
        .replace('₸', "")
        .replace('₽', "")
        .replace("р.", "");
    let clean = clean.trim();

    let grouped_re = Regex::new(r"\b(\d{1,3}(?:\s\d{3})+|\d{1,3})\b").expect("valid regex");
    for cap in grouped_re.captures_iter(clean) {
        let joined: String = cap[1].split_whitespace().collect();
        if let Ok(value) = joined.parse::<f64>() {
            if is_plausible(value) {
                return Some(value);
            }
        }
    }

    let bare_re = Regex::new(r"\b(\d{3,7})\b").expect("valid regex");
    for cap in bare_re.captures_iter(clean) {
        if let Ok(value) = cap[1].parse::<f64>() {
            if is_plausible(value) {
                return Some(value);
            }
        }
    }

    None
}

/// Collect every in-band price immediately followed by `glyph` in `text`.
///
/// Used for the last-resort "scan the whole element text" strategy where no
/// dedicated price markup exists.
#[must_use]
pub fn currency_marked_prices(text: &str, glyph: &str) -> Vec<f64> {
    let pattern = format!(r"(\d{{1,3}}(?:\s\d{{3}})*)\s*{}", regex::escape(glyph));
    let re = Regex::new(&pattern).expect("valid regex");
    re.captures_iter(text)
        .filter_map(|cap| {
            let joined: String = cap[1].split_whitespace().collect();
            joined.parse::<f64>().ok()
        })
        .filter(|&v| is_plausible(v))
        .collect()
}

/// Split a set of candidate prices into (current, old).
///
/// The minimum is the current price. The maximum becomes the old price only
/// when strictly greater — equal or inverted candidates collapse old to
/// `None`, since a "discount" to the same price is display noise.
#[must_use]
pub fn pick_current_and_old(prices: &[f64]) -> Option<(f64, Option<f64>)> {
    let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
    if !min.is_finite() {
        return None;
    }
    let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let old = if max > min { Some(max) } else { None };
    Some((min, old))
}

/// Normalize a (current, old) pair: drop the old price unless strictly
/// greater than the current one.
#[must_use]
pub fn validate_old_price(current: f64, old: Option<f64>) -> Option<f64> {
    old.filter(|&o| o > current)
}
