//! Product detail-page parsing.
//!
//! Detail pages are parsed with their own cascade: JSON-LD structured data
//! when present, then the rendered `<h1>` heading. Imagery and the price
//! pair are harvested page-wide in both cases since the page describes a
//! single product.

use modacat_core::brands::BrandLexicon;
use modacat_core::domain::{self, MarketDomain};
use modacat_core::product_type::classify_product_type;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use crate::price;
use crate::sku;
use crate::types::ProductDetails;

const DETAIL_PRICE_SELECTORS: &[&str] = &[
    r#"[data-testid="price-current"]"#,
    ".price-current",
    ".price__current",
    ".product-price__current",
    r#"span[class*="price"][class*="current"]"#,
];

const DETAIL_OLD_PRICE_SELECTORS: &[&str] = &[
    r#"[data-testid="price-old"]"#,
    ".price-old",
    ".price__old",
    ".product-price__old",
];

const IMAGE_SRC_ATTRS: &[&str] = &["src", "data-src", "data-lazy-src", "data-original"];

/// Parse a product detail page.
///
/// Returns `None` when no product name or no in-band price can be
/// recovered; a detail record without either is not worth emitting.
#[must_use]
pub fn parse_product_page(
    html: &str,
    url: &str,
    domain: MarketDomain,
    lexicon: &BrandLexicon,
) -> Option<ProductDetails> {
    let doc = Html::parse_document(html);
    let image_urls = harvest_images(&doc, domain);
    let page_prices = detail_prices(&doc, domain);

    if let Some(details) = from_json_ld(html, url, lexicon, &image_urls, page_prices) {
        return Some(details);
    }
    if let Some(details) = from_embedded_state(html) {
        return Some(details);
    }
    from_heading(&doc, url, lexicon, &image_urls, page_prices)
}

/// Structured-data pass: any script block carrying a JSON-LD `Product`.
///
/// Some pages HTML-escape the block, so `&quot;` and `&amp;` are unescaped
/// before parsing, and a wrapping array is unwrapped.
fn from_json_ld(
    html: &str,
    url: &str,
    lexicon: &BrandLexicon,
    image_urls: &[String],
    page_prices: Option<(f64, Option<f64>)>,
) -> Option<ProductDetails> {
    let script_re = Regex::new(r"(?is)<script\b[^>]*>(.*?)</script>").expect("valid regex");

    for cap in script_re.captures_iter(html) {
        let content = cap.get(1).map_or("", |m| m.as_str());
        if !content.contains("@type") || !content.contains("Product") {
            continue;
        }
        let unescaped = content.replace("&quot;", "\"").replace("&amp;", "&");
        let Ok(value) = serde_json::from_str::<Value>(unescaped.trim()) else {
            continue;
        };

        let product = match value {
            Value::Array(items) => match items.into_iter().find(is_json_ld_product) {
                Some(p) => p,
                None => continue,
            },
            other if is_json_ld_product(&other) => other,
            _ => continue,
        };
        let obj = product.as_object()?;

        let name = obj.get("name").and_then(Value::as_str).unwrap_or("").trim();
        if name.is_empty() {
            continue;
        }

        let offer_price = offer_price(obj).filter(|&p| price::is_plausible(p));
        let current = offer_price.or(page_prices.map(|(c, _)| c))?;
        let old_price = price::validate_old_price(current, page_prices.and_then(|(_, o)| o));

        let brand = json_ld_brand(obj)
            .or_else(|| lexicon.find_in(name).map(str::to_owned))
            .unwrap_or_else(|| "Unknown".to_owned());
        let sku = obj
            .get("sku")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map_or_else(|| sku::synthesize_sku(url), str::to_owned);
        let description = obj
            .get("description")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);

        return Some(ProductDetails {
            sku,
            name: name.to_owned(),
            brand,
            price: current,
            old_price,
            url: url.to_owned(),
            image_url: image_urls.first().cloned().unwrap_or_default(),
            image_urls: image_urls.to_vec(),
            description,
            product_type: classify_product_type(name).map(str::to_owned),
        });
    }
    None
}

fn is_json_ld_product(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(t)) => t == "Product",
        Some(Value::Array(types)) => types.iter().any(|t| t == "Product"),
        _ => false,
    }
}

fn json_ld_brand(obj: &serde_json::Map<String, Value>) -> Option<String> {
    match obj.get("brand")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(brand) => brand
            .get("name")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_owned),
        _ => None,
    }
}

/// `offers` is an object or an array of objects; `price` a string or number.
fn offer_price(obj: &serde_json::Map<String, Value>) -> Option<f64> {
    let offers = obj.get("offers")?;
    let offer = match offers {
        Value::Array(items) => items.first()?,
        other => other,
    };
    match offer.get("price")? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|&p| p > 0.0)
}

/// Framework state (`window.__NUXT__`) is recognized but not yet mined;
/// pages that ship it also render a heading, which the next pass handles.
fn from_embedded_state(html: &str) -> Option<ProductDetails> {
    if html.contains("window.__NUXT__") {
        tracing::debug!("detail page ships framework state; using heading parse");
    }
    None
}

/// Heading pass: brand and name from the first `<h1>`.
///
/// Markup usually nests brand and name in separate child elements (two
/// text chunks); a single-chunk heading is split on a known brand prefix.
fn from_heading(
    doc: &Html,
    url: &str,
    lexicon: &BrandLexicon,
    image_urls: &[String],
    page_prices: Option<(f64, Option<f64>)>,
) -> Option<ProductDetails> {
    let h1_sel = Selector::parse("h1").expect("valid selector");
    let h1 = doc.select(&h1_sel).next()?;

    let chunks: Vec<String> = h1
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect();

    let (brand, name) = if chunks.len() >= 2 {
        (chunks[0].clone(), chunks[1..].join(" "))
    } else {
        let heading = chunks.first()?.clone();
        match lexicon.split_prefix(&heading) {
            Some((brand, rest)) if !rest.is_empty() => (brand.to_owned(), rest.to_owned()),
            _ => ("Unknown".to_owned(), heading),
        }
    };
    if name.is_empty() {
        return None;
    }

    let (current, old_price) = page_prices?;

    Some(ProductDetails {
        sku: sku::synthesize_sku(url),
        name: name.clone(),
        brand,
        price: current,
        old_price,
        url: url.to_owned(),
        image_url: image_urls.first().cloned().unwrap_or_default(),
        image_urls: image_urls.to_vec(),
        description: None,
        product_type: classify_product_type(&name).map(str::to_owned),
    })
}

/// Current/old price pair from dedicated markup, with a page-wide
/// currency-glyph scan as the fallback.
fn detail_prices(doc: &Html, domain: MarketDomain) -> Option<(f64, Option<f64>)> {
    let glyph = domain.currency_glyph();

    let current = first_selector_price(doc, DETAIL_PRICE_SELECTORS, glyph);
    if let Some(current) = current {
        let old = first_selector_price(doc, DETAIL_OLD_PRICE_SELECTORS, glyph);
        return Some((current, price::validate_old_price(current, old)));
    }

    let text = element_text(doc.root_element());
    let candidates = price::currency_marked_prices(&text, glyph);
    price::pick_current_and_old(&candidates)
}

fn first_selector_price(doc: &Html, selectors: &[&str], glyph: &str) -> Option<f64> {
    for raw in selectors {
        let selector = Selector::parse(raw).expect("valid selector");
        for el in doc.select(&selector) {
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

/// Every CDN-hosted product image on the page, in document order.
fn harvest_images(doc: &Html, domain: MarketDomain) -> Vec<String> {
    let img = Selector::parse("img").expect("valid selector");
    let mut urls = Vec::new();
    for el in doc.select(&img) {
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

fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
