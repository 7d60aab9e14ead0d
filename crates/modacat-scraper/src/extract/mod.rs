//! Catalog-page extraction: three strategies tried in order, first
//! non-empty result wins.
//!
//! 1. [`embedded`] — product array embedded in framework state scripts.
//! 2. [`cards`] — structural pass over rendered product-card markup.
//! 3. [`text`] — diagnostic regex scan over flattened text (never emits).
//!
//! The winning strategy's records are deduplicated by SKU (first
//! occurrence wins, listing order preserved) and truncated to the limit.

mod cards;
mod embedded;
mod text;

pub use text::{TextCandidate, scan_text_candidates};

use std::collections::HashSet;

use modacat_core::brands::BrandLexicon;
use modacat_core::domain::MarketDomain;

use crate::types::ProductRecord;

type Strategy = fn(&str, usize, MarketDomain, &BrandLexicon) -> Vec<ProductRecord>;

const STRATEGIES: &[(&str, Strategy)] = &[
    ("embedded_json", embedded::extract_embedded as Strategy),
    ("html_cards", cards::extract_cards as Strategy),
    ("text_scan", text::extract_text as Strategy),
];

/// Extract up to `limit` products from a catalog page.
///
/// Returns an empty vector when every strategy comes up empty; the caller
/// decides whether that warrants fallback data.
#[must_use]
pub fn extract(
    html: &str,
    limit: usize,
    domain: MarketDomain,
    lexicon: &BrandLexicon,
) -> Vec<ProductRecord> {
    for (name, strategy) in STRATEGIES {
        let records = strategy(html, limit, domain, lexicon);
        if records.is_empty() {
            continue;
        }
        tracing::debug!(strategy = name, count = records.len(), "extraction strategy won");
        return dedupe_by_sku(records, limit);
    }
    tracing::debug!("no extraction strategy produced records");
    Vec::new()
}

/// Drop records whose SKU was already seen, keeping listing order, then
/// truncate to `limit`.
fn dedupe_by_sku(records: Vec<ProductRecord>, limit: usize) -> Vec<ProductRecord> {
    let mut seen = HashSet::new();
    let mut unique: Vec<ProductRecord> = records
        .into_iter()
        .filter(|r| seen.insert(r.sku.clone()))
        .collect();
    unique.truncate(limit);
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> BrandLexicon {
        BrandLexicon::default()
    }

    #[test]
    fn minimal_embedded_element_yields_one_record() {
        let html = r#"<script>{"products": [{"sku": "AB1", "name": "Shirt", "price_amount": "1000"}]}</script>"#;
        let records = extract(html, 10, MarketDomain::Kz, &lexicon());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sku, "AB1");
        assert_eq!(records[0].name, "Shirt");
        assert_eq!(records[0].price, 1000.0);
    }

    #[test]
    fn embedded_strategy_preempts_card_markup() {
        // Both an embedded array and enough card markup to pass the card
        // threshold; the embedded result must win.
        let cards: String = (1..=4)
            .map(|i| {
                format!(
                    r#"<a href="/p/cd00{i}xw0000{i}/x/" class="product-card">
                         <span class="price">3 99{i} ₸</span></a>"#
                )
            })
            .collect();
        let html = format!(
            r#"<script>{{"products": [{{"sku": "EMB12345", "name": "Из скрипта", "price_amount": "5000"}}]}}</script>{cards}"#
        );
        let records = extract(&html, 10, MarketDomain::Kz, &lexicon());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sku, "EMB12345");
    }

    #[test]
    fn falls_through_to_cards_when_no_embedded_json() {
        let cards: String = (1..=4)
            .map(|i| {
                format!(
                    r#"<a href="/p/cd00{i}xw0000{i}/x/" class="product-card">
                         <div class="product-name">Товар номер {i}</div>
                         <span class="price">3 99{i} ₸</span></a>"#
                )
            })
            .collect();
        let records = extract(&cards, 10, MarketDomain::Kz, &lexicon());
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].sku, "CD001XW00001");
    }

    #[test]
    fn duplicate_skus_keep_first_occurrence() {
        let html = r#"<script>{"products": [
            {"sku": "DUP12345", "name": "Первый", "price_amount": "1000"},
            {"sku": "DUP12345", "name": "Второй", "price_amount": "2000"},
            {"sku": "OTH12345", "name": "Третий", "price_amount": "3000"}
        ]}</script>"#;
        let records = extract(html, 10, MarketDomain::Kz, &lexicon());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Первый");
        assert_eq!(records[1].sku, "OTH12345");
    }

    #[test]
    fn duplicates_do_not_consume_limit_slots() {
        let html = r#"<script>{"products": [
            {"sku": "DUP12345", "name": "Первый", "price_amount": "1000"},
            {"sku": "DUP12345", "name": "Второй", "price_amount": "2000"},
            {"sku": "OTH12345", "name": "Третий", "price_amount": "3000"}
        ]}</script>"#;
        let records = extract(html, 2, MarketDomain::Kz, &lexicon());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sku, "DUP12345");
        assert_eq!(records[0].name, "Первый");
        assert_eq!(records[1].sku, "OTH12345");
    }

    #[test]
    fn unextractable_page_yields_empty() {
        let html = "<html><body><p>ничего похожего на каталог</p></body></html>";
        assert!(extract(html, 10, MarketDomain::Kz, &lexicon()).is_empty());
    }
}
