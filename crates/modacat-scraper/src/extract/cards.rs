//! Strategy 2: structural extraction from rendered product-card markup.
//!
//! Used when the page carries no parseable embedded JSON (server-rendered
//! or partially rendered documents). Cards are located by trying a priority
//! list of selectors; a selector only wins when it matches enough elements
//! to plausibly be the product grid rather than page chrome.

use modacat_core::brands::BrandLexicon;
use modacat_core::domain::{self, MarketDomain, PRODUCT_PATH_MARKER};
use scraper::{ElementRef, Html, Selector};

use crate::price;
use crate::sku;
use crate::types::ProductRecord;

/// A card selector must match more elements than this to be trusted.
const CARD_COUNT_THRESHOLD: usize = 3;

/// Card candidates, most specific first.
const CARD_SELECTORS: &[&str] = &[
    r#"a[href*="/p/"]"#,
    r#"div[class*="product"] a[href]"#,
    "article a[href]",
    ".product-card",
    ".product-item",
    ".catalog-item",
    r#"[class*="product"]"#,
    r#"[class*="card"]"#,
    "article",
];

const NAME_SELECTORS: &[&str] = &[
    r#"h3[class*="title"]"#,
    r#"div[class*="title"]"#,
    r#"span[class*="title"]"#,
    r#"div[class*="product-name"]"#,
    r#"span[class*="product-name"]"#,
    r#"[data-testid*="title"]"#,
    r#"[data-testid*="name"]"#,
    "h1, h2, h3, h4",
];

const BRAND_SELECTORS: &[&str] = &[
    r#"span[class*="brand"]"#,
    r#"div[class*="brand"]"#,
    r#"[data-testid*="brand"]"#,
];

const PRICE_NEW_SELECTORS: &[&str] = &[
    ".x-product-card-description__price-new",
    r#"span[class*="price-new"]"#,
    r#"span[class*="price_new"]"#,
];

const PRICE_OLD_SELECTORS: &[&str] = &[
    ".x-product-card-description__price-old",
    r#"span[class*="price-old"]"#,
    r#"span[class*="price_old"]"#,
];

const PRICE_SINGLE_SELECTORS: &[&str] = &[
    r#"span[class*="price"]"#,
    r#"div[class*="price"]"#,
    r#"[data-testid*="price"]"#,
];

const IMAGE_SRC_ATTRS: &[&str] = &["src", "data-src", "data-lazy-src", "data-original"];

/// Every extractable card is collected; SKU deduplication and the limit
/// cut happen in the cascade afterwards.
pub(crate) fn extract_cards(
    html: &str,
    _limit: usize,
    domain: MarketDomain,
    lexicon: &BrandLexicon,
) -> Vec<ProductRecord> {
    let doc = Html::parse_document(html);

    let mut cards: Vec<ElementRef<'_>> = Vec::new();
    for raw in CARD_SELECTORS {
        let selector = Selector::parse(raw).expect("valid selector");
        let found: Vec<ElementRef<'_>> = doc.select(&selector).collect();
        if found.len() > CARD_COUNT_THRESHOLD {
            tracing::debug!(selector = raw, count = found.len(), "product cards matched");
            cards = found;
            break;
        }
    }
    if cards.is_empty() {
        return Vec::new();
    }

    let mut records = Vec::new();
    for (index, card) in cards.into_iter().enumerate() {
        if let Some(record) = record_from_card(card, index, domain, lexicon) {
            records.push(record);
        }
    }
    records
}

/// Build a record from one card. A card without a resolvable detail-page
/// URL or an in-band price is not a product.
fn record_from_card(
    card: ElementRef<'_>,
    index: usize,
    domain: MarketDomain,
    lexicon: &BrandLexicon,
) -> Option<ProductRecord> {
    let url = card_url(card, domain)?;
    let (price, old_price) = card_prices(card, domain)?;

    let name = card_name(card).unwrap_or_else(|| "Product".to_owned());
    let brand = card_brand(card, lexicon).unwrap_or_else(|| "Unknown".to_owned());
    let image_urls = card_images(card, domain);
    let image_url = image_urls.first().cloned().unwrap_or_default();
    let sku = sku::sku_from_path(&url)
        .unwrap_or_else(|| format!("LMD{}{:04}", domain.code(), index + 1));

    Some(ProductRecord {
        sku,
        name,
        brand,
        price,
        old_price,
        url,
        image_url,
        image_urls,
    })
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn card_name(card: ElementRef<'_>) -> Option<String> {
    for raw in NAME_SELECTORS {
        let selector = Selector::parse(raw).expect("valid selector");
        for el in card.select(&selector) {
            let text = element_text(el);
            if text.len() > 3 && text != "Product" {
                return Some(text.chars().take(100).collect());
            }
        }
    }
    None
}

/// Prefer a dedicated brand element; fall back to scanning the card text
/// for a known brand.
fn card_brand(card: ElementRef<'_>, lexicon: &BrandLexicon) -> Option<String> {
    for raw in BRAND_SELECTORS {
        let selector = Selector::parse(raw).expect("valid selector");
        if let Some(el) = card.select(&selector).next() {
            let text = element_text(el);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    lexicon.find_in(&element_text(card)).map(str::to_owned)
}

/// Price cascade: discounted pair markup, then single-price markup, then a
/// currency-glyph scan over the whole card text.
fn card_prices(card: ElementRef<'_>, domain: MarketDomain) -> Option<(f64, Option<f64>)> {
    let glyph = domain.currency_glyph();

    if let Some(current) = first_marked_price(card, PRICE_NEW_SELECTORS, glyph, true) {
        let old = first_marked_price(card, PRICE_OLD_SELECTORS, glyph, false);
        return Some((current, price::validate_old_price(current, old)));
    }

    if let Some(single) = first_marked_price(card, PRICE_SINGLE_SELECTORS, glyph, true) {
        return Some((single, None));
    }

    let candidates = price::currency_marked_prices(&element_text(card), glyph);
    price::pick_current_and_old(&candidates)
}

/// `skip_old` excludes elements whose class contains `"old"`; the broad
/// current/single-price selectors also catch old-price markup, but the
/// dedicated old-price lookup must of course keep it.
fn first_marked_price(
    card: ElementRef<'_>,
    selectors: &[&str],
    glyph: &str,
    skip_old: bool,
) -> Option<f64> {
    for raw in selectors {
        let selector = Selector::parse(raw).expect("valid selector");
        for el in card.select(&selector) {
            let class = el.value().attr("class").unwrap_or("");
            if skip_old && class.contains("old") {
                continue;
            }
            let text = element_text(el);
            if !text.contains(glyph) {
                continue;
            }
            if let Some(value) = price::parse_price(&text) {
                return Some(value);
            }
        }
    }
    None
}

/// Resolve the detail-page URL: the card's own href, an anchor inside it,
/// or an anchor on one of up to three ancestor levels.
fn card_url(card: ElementRef<'_>, domain: MarketDomain) -> Option<String> {
    if let Some(href) = card.value().attr("href") {
        if href.contains(PRODUCT_PATH_MARKER) {
            return domain.absolutize(href);
        }
    }

    let anchor = Selector::parse("a[href]").expect("valid selector");
    if let Some(href) = card
        .select(&anchor)
        .filter_map(|a| a.value().attr("href"))
        .find(|h| h.contains(PRODUCT_PATH_MARKER))
    {
        return domain.absolutize(href);
    }

    for ancestor in card.ancestors().filter_map(ElementRef::wrap).take(3) {
        if let Some(href) = ancestor.value().attr("href") {
            if href.contains(PRODUCT_PATH_MARKER) {
                return domain.absolutize(href);
            }
        }
    }
    None
}

/// Collect product imagery from the card, checking lazy-loading attributes
/// as well as `src`. Only CDN-hosted images with a known extension count.
fn card_images(card: ElementRef<'_>, domain: MarketDomain) -> Vec<String> {
    let img = Selector::parse("img").expect("valid selector");
    let mut urls = Vec::new();
    for el in card.select(&img) {
        for attr in IMAGE_SRC_ATTRS {
            let Some(raw) = el.value().attr(attr) else {
                continue;
            };
            let Some(absolute) = domain.absolutize(raw) else {
                continue;
            };
            if domain::is_product_image_url(&absolute) && !urls.contains(&absolute) {
                urls.push(absolute);
            }
        }
    }
    urls
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_page() -> String {
        let card = |sku: &str, name: &str, brand: &str, body: &str| {
            format!(
                r#"<a class="product-card" href="/p/{}/catalog-item/">
                     <img data-src="//a.lmcdn.ru/img600x866/X/{}_1.jpg" src="/spinner.svg">
                     <span class="brand">{brand}</span>
                     <div class="product-name">{name}</div>
                     {body}
                   </a>"#,
                sku.to_lowercase(),
                sku,
            )
        };
        format!(
            "<html><body><div class=\"grid\">{}{}{}{}</div></body></html>",
            card(
                "HE002EM00001",
                "Кроссовки Air Max",
                "Nike",
                r#"<span class="price-new">12 990 ₸</span><span class="price-old">15 990 ₸</span>"#,
            ),
            card(
                "RT001EW00002",
                "Футболка базовая",
                "Adidas",
                r#"<span class="price">4 990 ₸</span>"#,
            ),
            card(
                "MP003XW00003",
                "Шорты спортивные",
                "Puma",
                "<div>со скидкой 9 990 ₸</div>",
            ),
            card("NO004PR00004", "Без цены", "Reebok", "<div>нет в наличии</div>"),
        )
    }

    #[test]
    fn extracts_discounted_card() {
        let records = extract_cards(&grid_page(), 10, MarketDomain::Kz, &BrandLexicon::default());
        let r = records
            .iter()
            .find(|r| r.sku == "HE002EM00001")
            .expect("discounted card extracted");
        assert_eq!(r.name, "Кроссовки Air Max");
        assert_eq!(r.brand, "Nike");
        assert_eq!(r.price, 12_990.0);
        assert_eq!(r.old_price, Some(15_990.0));
        assert_eq!(r.url, "https://www.lamoda.kz/p/he002em00001/catalog-item/");
        assert_eq!(
            r.image_urls,
            vec!["https://a.lmcdn.ru/img600x866/X/HE002EM00001_1.jpg".to_owned()]
        );
    }

    #[test]
    fn single_price_card_has_no_old_price() {
        let records = extract_cards(&grid_page(), 10, MarketDomain::Kz, &BrandLexicon::default());
        let r = records.iter().find(|r| r.sku == "RT001EW00002").unwrap();
        assert_eq!(r.price, 4990.0);
        assert_eq!(r.old_price, None);
    }

    #[test]
    fn currency_scan_recovers_unmarked_price() {
        let records = extract_cards(&grid_page(), 10, MarketDomain::Kz, &BrandLexicon::default());
        let r = records.iter().find(|r| r.sku == "MP003XW00003").unwrap();
        assert_eq!(r.price, 9990.0);
    }

    #[test]
    fn card_without_price_is_dropped() {
        let records = extract_cards(&grid_page(), 10, MarketDomain::Kz, &BrandLexicon::default());
        assert!(records.iter().all(|r| r.sku != "NO004PR00004"));
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn too_few_matches_yield_nothing() {
        let html = r#"<a href="/p/he002em00001/x/"><span class="price">5 990 ₸</span></a>"#;
        let records = extract_cards(html, 10, MarketDomain::Kz, &BrandLexicon::default());
        assert!(records.is_empty());
    }

    #[test]
    fn collects_all_cards_leaving_truncation_to_the_cascade() {
        let records = extract_cards(&grid_page(), 2, MarketDomain::Kz, &BrandLexicon::default());
        assert_eq!(records.len(), 3, "the limit is applied after deduplication");
    }

    #[test]
    fn url_is_found_on_ancestor_anchor() {
        // Five inner divs so the [class*="card"] selector clears the
        // threshold while the href lives on the wrapping anchor.
        let inner: String = (1..=5)
            .map(|i| {
                format!(
                    r#"<div class="card-slot"><span class="price">{i} 990 ₸</span></div>"#
                )
            })
            .collect();
        let html = format!(r#"<a href="/p/an006cs00006/wrapped/">{inner}</a>"#);
        let records = extract_cards(&html, 10, MarketDomain::Kz, &BrandLexicon::default());
        assert!(!records.is_empty());
        assert!(records
            .iter()
            .all(|r| r.url == "https://www.lamoda.kz/p/an006cs00006/wrapped/"));
    }
}
