//! Strategy 1: embedded JSON extraction from inline script blocks.
//!
//! Catalog pages ship their product grid as JSON inside framework state
//! scripts. The array is located textually (key name, then bracket-balanced
//! scan to the matching `]`) because the surrounding script is JavaScript,
//! not parseable JSON.

use modacat_core::brands::BrandLexicon;
use modacat_core::domain::{IMAGE_CDN_BASE, MarketDomain};
use regex::Regex;
use serde_json::Value;

use crate::price;
use crate::types::ProductRecord;

/// Container keys that may hold the product array when it is not under a
/// top-level `"products"` key. One level only; the textual `"products"`
/// search already reaches arbitrarily nested occurrences.
const CONTAINER_KEYS: [&str; 4] = ["items", "catalog", "results", "data"];

/// Scan `<script>` contents for a products array and map its elements.
///
/// Every parseable element is collected; SKU deduplication and the limit
/// cut happen in the cascade afterwards, so a duplicate never costs a
/// unique record its slot.
pub(crate) fn extract_embedded(
    html: &str,
    _limit: usize,
    domain: MarketDomain,
    _lexicon: &BrandLexicon,
) -> Vec<ProductRecord> {
    let script_re = Regex::new(r"(?is)<script\b[^>]*>(.*?)</script>").expect("valid regex");

    let mut records = Vec::new();
    for cap in script_re.captures_iter(html) {
        let content = match cap.get(1) {
            Some(m) => m.as_str(),
            None => continue,
        };
        if content.is_empty() {
            continue;
        }
        collect_from_script(content, domain, &mut records);
    }
    records
}

fn collect_from_script(content: &str, domain: MarketDomain, out: &mut Vec<ProductRecord>) {
    if content.contains("\"products\"") {
        if let Some(array_str) = find_keyed_array(content, "products") {
            append_from_array(array_str, domain, out);
            if !out.is_empty() {
                return;
            }
        }
    }

    for key in CONTAINER_KEYS {
        if !content.contains(&format!("\"{key}\"")) {
            continue;
        }
        if let Some(array_str) = find_keyed_array(content, key) {
            append_from_array(array_str, domain, out);
            if !out.is_empty() {
                return;
            }
        }
    }
}

fn append_from_array(array_str: &str, domain: MarketDomain, out: &mut Vec<ProductRecord>) {
    let parsed: Value = match serde_json::from_str(array_str) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(error = %e, "embedded array is not valid JSON — skipping");
            return;
        }
    };
    let Value::Array(items) = parsed else { return };

    for item in &items {
        if let Some(record) = record_from_json(item, domain) {
            out.push(record);
        }
    }
}

/// Locate the JSON array value of `"key"` in raw script text.
///
/// Tries every occurrence of the key: a match must be followed by `:` and
/// `[`, and the array must terminate with a balanced `]`.
fn find_keyed_array<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    let needle = format!("\"{key}\"");
    let mut search_from = 0usize;

    while let Some(rel) = text[search_from..].find(&needle) {
        let key_pos = search_from + rel;
        let after_key = key_pos + needle.len();

        let rest = text[after_key..].trim_start();
        if let Some(rest) = rest.strip_prefix(':') {
            let rest = rest.trim_start();
            if rest.starts_with('[') {
                if let Some(array_str) = balanced_array(rest) {
                    return Some(array_str);
                }
            }
        }
        search_from = after_key;
    }
    None
}

/// Extract a balanced JSON array from the start of `s`.
///
/// Scans character-by-character tracking bracket depth, respecting string
/// literals and escape sequences. Only `]` (not `}`) at depth 0 triggers a
/// return, so malformed input like `[42}` is never accepted.
pub(in crate::extract) fn balanced_array(s: &str) -> Option<&str> {
    if !s.starts_with('[') {
        return None;
    }
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escape = false;
    for (i, c) in s.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        if in_string {
            match c {
                '\\' => escape = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            '}' => depth -= 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Map one embedded JSON element to a [`ProductRecord`].
///
/// Rejects elements missing a SKU, a name, or an in-band price.
fn record_from_json(item: &Value, domain: MarketDomain) -> Option<ProductRecord> {
    let obj = item.as_object()?;

    let sku = obj.get("sku").and_then(Value::as_str).unwrap_or("").trim();
    let name = obj.get("name").and_then(Value::as_str).unwrap_or("").trim();
    if sku.is_empty() || name.is_empty() {
        return None;
    }

    let price = numeric_field(obj.get("price_amount"))?;
    if !price::is_plausible(price) {
        tracing::debug!(sku, price, "embedded product price out of band — skipping");
        return None;
    }
    let old_price = price::validate_old_price(price, numeric_field(obj.get("old_price_amount")));

    let brand = obj
        .get("brand")
        .and_then(|b| b.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("Unknown")
        .to_owned();

    let url = product_url(obj, sku, domain);

    let mut image_urls: Vec<String> = Vec::new();
    if let Some(thumbnail) = obj.get("thumbnail").and_then(Value::as_str) {
        if let Some(absolute) = absolutize_image(thumbnail) {
            image_urls.push(absolute);
        }
    }
    if let Some(gallery) = obj.get("gallery").and_then(Value::as_array) {
        for path in gallery.iter().filter_map(Value::as_str) {
            if let Some(absolute) = absolutize_image(path) {
                if !image_urls.contains(&absolute) {
                    image_urls.push(absolute);
                }
            }
        }
    }
    let image_url = image_urls.first().cloned().unwrap_or_default();

    Some(ProductRecord {
        sku: sku.to_owned(),
        name: name.to_owned(),
        brand,
        price,
        old_price,
        url,
        image_url,
        image_urls,
    })
}

/// Parse a JSON field that is either a number or a numeric string.
/// Returns `None` for absent, non-numeric, or non-positive values.
fn numeric_field(value: Option<&Value>) -> Option<f64> {
    let value = value?;
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    (parsed > 0.0).then_some(parsed)
}

/// Resolve the detail-page URL: the explicit `url` field when present,
/// otherwise `/p/{sku}/{seo_tail}/` in the storefront's canonical shape.
fn product_url(obj: &serde_json::Map<String, Value>, sku: &str, domain: MarketDomain) -> String {
    if let Some(explicit) = obj.get("url").and_then(Value::as_str) {
        if !explicit.is_empty() {
            if let Some(absolute) = domain.absolutize(explicit) {
                return absolute;
            }
        }
    }

    let sku_lower = sku.to_lowercase();
    match obj.get("seo_tail").and_then(Value::as_str) {
        Some(seo_tail) if !seo_tail.is_empty() => {
            format!("{}/p/{sku_lower}/{seo_tail}/", domain.host())
        }
        _ => format!("{}/p/{sku_lower}/", domain.host()),
    }
}

/// Gallery paths are root-relative on the image CDN; thumbnails are
/// occasionally already absolute.
fn absolutize_image(path: &str) -> Option<String> {
    if path.starts_with("http://") || path.starts_with("https://") {
        Some(path.to_owned())
    } else if let Some(rest) = path.strip_prefix("//") {
        Some(format!("https://{rest}"))
    } else if path.starts_with('/') {
        Some(format!("{IMAGE_CDN_BASE}{path}"))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page_with_script(script: &str) -> String {
        format!("<html><body><script>{script}</script></body></html>")
    }

    fn lexicon() -> BrandLexicon {
        BrandLexicon::default()
    }

    #[test]
    fn balanced_array_accepts_nested_objects() {
        let s = r#"[{"a": [1, 2]}, {"b": "x]y"}] trailing"#;
        assert_eq!(balanced_array(s), Some(r#"[{"a": [1, 2]}, {"b": "x]y"}]"#));
    }

    #[test]
    fn balanced_array_rejects_mismatched_closer() {
        assert_eq!(balanced_array("[42}"), None);
    }

    #[test]
    fn balanced_array_rejects_unterminated_input() {
        assert_eq!(balanced_array(r#"[{"a": 1}"#), None);
    }

    #[test]
    fn keyed_array_skips_non_array_occurrences() {
        let text = r#"{"products": "none here"} ... "products": [{"sku": "X"}]"#;
        assert_eq!(find_keyed_array(text, "products"), Some(r#"[{"sku": "X"}]"#));
    }

    #[test]
    fn extracts_products_from_framework_state() {
        let script = r#"window.__NUXT__ = {"state": {"catalog": {"products": [
            {"sku": "RTLAEK537801", "name": "Шорты спортивные", "brand": {"name": "Nike"},
             "price_amount": "12990", "old_price_amount": "15990",
             "seo_tail": "clothes-nike-shorty", "thumbnail": "/img600x866/R/T/x.jpg",
             "gallery": ["/img600x866/R/T/x.jpg", "/img600x866/R/T/y.jpg"]}
        ]}}};"#;
        let records = extract_embedded(&page_with_script(script), 10, MarketDomain::Kz, &lexicon());

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.sku, "RTLAEK537801");
        assert_eq!(r.brand, "Nike");
        assert_eq!(r.price, 12_990.0);
        assert_eq!(r.old_price, Some(15_990.0));
        assert_eq!(
            r.url,
            "https://www.lamoda.kz/p/rtlaek537801/clothes-nike-shorty/"
        );
        assert_eq!(r.image_url, "https://a.lmcdn.ru/img600x866/R/T/x.jpg");
        assert_eq!(r.image_urls.len(), 2, "thumbnail deduplicated against gallery");
    }

    #[test]
    fn falls_back_to_container_keys() {
        let script = r#"var state = {"items": [
            {"sku": "AB1CD2EF3", "name": "Футболка", "price_amount": 4990}
        ]};"#;
        let records = extract_embedded(&page_with_script(script), 10, MarketDomain::Kz, &lexicon());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sku, "AB1CD2EF3");
    }

    #[test]
    fn rejects_elements_missing_required_fields() {
        let script = serde_json::to_string(&json!({
            "products": [
                {"name": "No sku", "price_amount": "5000"},
                {"sku": "NOPRICE1", "name": "Товар"},
                {"sku": "NEGPRICE", "name": "Товар", "price_amount": "-5"},
                {"sku": "OK123456", "name": "Товар", "price_amount": "5000"}
            ]
        }))
        .unwrap();
        let records = extract_embedded(&page_with_script(&script), 10, MarketDomain::Kz, &lexicon());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sku, "OK123456");
    }

    #[test]
    fn out_of_band_price_is_rejected() {
        let script = r#"{"products": [{"sku": "CHEAP1", "name": "Брелок", "price_amount": "50"}]}"#;
        let records = extract_embedded(&page_with_script(script), 10, MarketDomain::Kz, &lexicon());
        assert!(records.is_empty());
    }

    #[test]
    fn equal_old_price_is_dropped() {
        let script =
            r#"{"products": [{"sku": "EQ123456", "name": "Кеды", "price_amount": "8990", "old_price_amount": "8990"}]}"#;
        let records = extract_embedded(&page_with_script(script), 10, MarketDomain::Kz, &lexicon());
        assert_eq!(records[0].old_price, None);
    }

    #[test]
    fn explicit_relative_url_is_absolutized() {
        let script = r#"{"products": [{"sku": "REL12345", "name": "Сабо", "price_amount": "6990",
            "url": "/p/rel12345/shoes-sabo/"}]}"#;
        let records = extract_embedded(&page_with_script(script), 10, MarketDomain::Ru, &lexicon());
        assert_eq!(
            records[0].url,
            "https://www.lamoda.ru/p/rel12345/shoes-sabo/"
        );
    }

    #[test]
    fn collects_every_element_leaving_truncation_to_the_cascade() {
        let script = r#"{"products": [
            {"sku": "A1234567", "name": "Один", "price_amount": "1000"},
            {"sku": "B1234567", "name": "Два", "price_amount": "2000"},
            {"sku": "C1234567", "name": "Три", "price_amount": "3000"}
        ]}"#;
        let records = extract_embedded(&page_with_script(script), 2, MarketDomain::Kz, &lexicon());
        assert_eq!(records.len(), 3, "the limit is applied after deduplication");
        assert_eq!(records[0].sku, "A1234567");
    }
}
