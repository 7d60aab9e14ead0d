//! Strategy 3: regex scan over flattened page text.
//!
//! Last resort for pages where neither embedded JSON nor card markup
//! survives. Flat text carries prices, brands, and names, but no URLs, so
//! candidates cannot become full records; the scan exists to show in the
//! logs what a structural pass missed. See [`scan_text_candidates`].

use modacat_core::brands::BrandLexicon;
use modacat_core::domain::MarketDomain;
use regex::Regex;

use crate::price;
use crate::types::ProductRecord;

/// A price/brand/name cluster found in flat page text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextCandidate {
    pub price: f64,
    pub old_price: Option<f64>,
    pub brand: Option<String>,
    pub name: String,
}

/// Diagnostic strategy: always yields zero records.
///
/// A record needs a detail-page URL and flat text has none, so candidates
/// are logged and dropped rather than emitted with fabricated URLs.
pub(crate) fn extract_text(
    html: &str,
    _limit: usize,
    domain: MarketDomain,
    lexicon: &BrandLexicon,
) -> Vec<ProductRecord> {
    let tag_re = Regex::new(r"<[^>]+>").expect("valid regex");
    let text = tag_re.replace_all(html, " ");

    let candidates = scan_text_candidates(&text, domain.currency_glyph(), lexicon);
    if !candidates.is_empty() {
        tracing::debug!(
            count = candidates.len(),
            "text scan found price clusters but no URLs; emitting nothing"
        );
        for candidate in &candidates {
            tracing::debug!(
                price = candidate.price,
                brand = candidate.brand.as_deref().unwrap_or("?"),
                name = %candidate.name,
                "unextractable product candidate"
            );
        }
    }
    Vec::new()
}

/// Scan flat text for `price(s) → glyph → latin brand → cyrillic name`
/// clusters. Up to three price figures may precede the glyph (current, old,
/// and bonus-point renderings collapse into one run when markup is
/// stripped); the minimum is taken as current.
#[must_use]
pub fn scan_text_candidates(text: &str, glyph: &str, lexicon: &BrandLexicon) -> Vec<TextCandidate> {
    let pattern = format!(
        r"((?:\d{{1,3}}(?:\s\d{{3}})*\s+){{0,2}}\d{{1,3}}(?:\s\d{{3}})*)\s*{}\s+([A-Z][A-Za-z&.'\-]*(?:\s+[A-Z&][A-Za-z&.'\-]*)*)\s+([А-Яа-яЁё][А-Яа-яЁёA-Za-z\s\-.,()]{{2,60}})",
        regex::escape(glyph)
    );
    let re = Regex::new(&pattern).expect("valid regex");
    let grouped_re = Regex::new(r"\d{1,3}(?:\s\d{3})*").expect("valid regex");

    let mut candidates = Vec::new();
    for cap in re.captures_iter(text) {
        let figures: Vec<f64> = grouped_re
            .find_iter(&cap[1])
            .filter_map(|m| {
                let joined: String = m.as_str().split_whitespace().collect();
                joined.parse::<f64>().ok()
            })
            .filter(|&v| price::is_plausible(v))
            .collect();
        let Some((current, old)) = price::pick_current_and_old(&figures) else {
            continue;
        };

        let raw_brand = cap[2].trim();
        let brand = lexicon
            .find_in(raw_brand)
            .map(str::to_owned)
            .or_else(|| (!raw_brand.is_empty()).then(|| raw_brand.to_owned()));

        let name = clean_name(&cap[3]);
        if name.len() < 3 {
            continue;
        }

        candidates.push(TextCandidate {
            price: current,
            old_price: old,
            brand,
            name,
        });
    }
    candidates
}

fn clean_name(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(100).collect()
}
