//! Synthetic placeholder catalog, substituted when live extraction yields
//! nothing (site redesign, blocked fetch, empty results).
//!
//! Demo records satisfy the same invariants as live ones — in-band prices,
//! `/p/` detail URLs, CDN image hosts — so downstream code needs no special
//! casing. Provenance is carried by [`crate::types::CatalogSource::Demo`],
//! never by the records themselves.

use modacat_core::domain::{IMAGE_CDN_BASE, MarketDomain};

use crate::types::ProductRecord;

struct DemoTemplate {
    brand: &'static str,
    name: &'static str,
    price: f64,
    old_price: Option<f64>,
}

const NIKE: &[DemoTemplate] = &[
    DemoTemplate {
        brand: "Nike",
        name: "Кроссовки Air Max 270",
        price: 45_990.0,
        old_price: Some(52_990.0),
    },
    DemoTemplate {
        brand: "Nike",
        name: "Футболка Dri-FIT",
        price: 12_990.0,
        old_price: None,
    },
    DemoTemplate {
        brand: "Nike",
        name: "Шорты спортивные Flex",
        price: 15_990.0,
        old_price: Some(19_990.0),
    },
];

const ADIDAS: &[DemoTemplate] = &[
    DemoTemplate {
        brand: "Adidas",
        name: "Кроссовки Ultraboost 22",
        price: 64_990.0,
        old_price: None,
    },
    DemoTemplate {
        brand: "Adidas",
        name: "Худи Essentials",
        price: 22_990.0,
        old_price: Some(27_990.0),
    },
    DemoTemplate {
        brand: "Adidas",
        name: "Брюки спортивные Tiro",
        price: 18_990.0,
        old_price: None,
    },
];

const PUMA: &[DemoTemplate] = &[
    DemoTemplate {
        brand: "Puma",
        name: "Кроссовки RS-X",
        price: 38_990.0,
        old_price: Some(44_990.0),
    },
    DemoTemplate {
        brand: "Puma",
        name: "Футболка Logo Tee",
        price: 9990.0,
        old_price: None,
    },
    DemoTemplate {
        brand: "Puma",
        name: "Куртка ветрозащитная",
        price: 29_990.0,
        old_price: None,
    },
];

const GENERIC_COUNT: usize = 5;

/// Build up to `limit` demo records for `query`.
#[must_use]
pub(crate) fn demo_records(query: &str, limit: usize, domain: MarketDomain) -> Vec<ProductRecord> {
    let lower = query.to_lowercase();
    let templates = if lower.contains("nike") {
        Some(NIKE)
    } else if lower.contains("adidas") {
        Some(ADIDAS)
    } else if lower.contains("puma") {
        Some(PUMA)
    } else {
        None
    };

    match templates {
        Some(templates) => templates
            .iter()
            .take(limit)
            .enumerate()
            .map(|(i, t)| demo_record(i, t.brand, t.name, t.price, t.old_price, domain))
            .collect(),
        None => (0..GENERIC_COUNT.min(limit))
            .map(|i| {
                let name = format!("Товар по запросу \"{query}\" №{}", i + 1);
                let price = 5990.0 + 1000.0 * i as f64;
                demo_record_owned(i, "Unknown", name, price, None, domain)
            })
            .collect(),
    }
}

fn demo_record(
    index: usize,
    brand: &str,
    name: &str,
    price: f64,
    old_price: Option<f64>,
    domain: MarketDomain,
) -> ProductRecord {
    demo_record_owned(index, brand, name.to_owned(), price, old_price, domain)
}

fn demo_record_owned(
    index: usize,
    brand: &str,
    name: String,
    price: f64,
    old_price: Option<f64>,
    domain: MarketDomain,
) -> ProductRecord {
    let sku = format!("DEMO{}{:03}", domain.code(), index + 1);
    let url = format!(
        "{}/p/{}/demo-product-{}/",
        domain.host(),
        sku.to_lowercase(),
        index + 1
    );
    let image_url = format!("{IMAGE_CDN_BASE}/img600x866/demo/{sku}_1.jpg");
    ProductRecord {
        sku,
        name,
        brand: brand.to_owned(),
        price,
        old_price,
        url,
        image_url: image_url.clone(),
        image_urls: vec![image_url],
    }
}
