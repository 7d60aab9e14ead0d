//! Domain types produced by catalog and detail-page extraction.
//!
//! Records are ephemeral: constructed from one page fetch, never mutated
//! afterwards. Persistence is the consumer's concern.

use serde::{Deserialize, Serialize};

/// A product extracted from a catalog (search-results) page.
///
/// Invariants enforced at construction time by the extraction strategies:
/// `price` lies within the plausibility band (see [`crate::price`]),
/// `old_price` is strictly greater than `price` when present, `url` resolves
/// to a product detail page, and `image_urls` is ordered and deduplicated
/// with `image_url` as its first entry when non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Site-assigned SKU, or an identifier derived from the product URL.
    pub sku: String,
    pub name: String,
    pub brand: String,
    /// Current price in whole native currency units.
    pub price: f64,
    /// Pre-discount price; absent unless strictly greater than `price`.
    pub old_price: Option<f64>,
    /// Absolute product detail-page URL.
    pub url: String,
    /// Primary image, kept separate for consumers that want exactly one.
    pub image_url: String,
    pub image_urls: Vec<String>,
}

/// A product parsed from its own detail page. Superset of [`ProductRecord`]
/// with fields only the detail page exposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetails {
    pub sku: String,
    pub name: String,
    pub brand: String,
    pub price: f64,
    pub old_price: Option<f64>,
    pub url: String,
    pub image_url: String,
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Garment type classified from the name, e.g. `"Кроссовки"`.
    #[serde(default)]
    pub product_type: Option<String>,
}

/// Where a catalog page's records came from.
///
/// `Demo` marks synthetic placeholder data substituted when live extraction
/// produced nothing. Keeping the tag on the result (rather than silently
/// mixing demo records in) lets consumers refuse synthetic data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSource {
    Live,
    Demo,
}

/// Result of a catalog search: the records plus their provenance tag.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogPage {
    pub source: CatalogSource,
    pub records: Vec<ProductRecord>,
}

impl CatalogPage {
    #[must_use]
    pub fn live(records: Vec<ProductRecord>) -> Self {
        CatalogPage {
            source: CatalogSource::Live,
            records,
        }
    }

    #[must_use]
    pub fn demo(records: Vec<ProductRecord>) -> Self {
        CatalogPage {
            source: CatalogSource::Demo,
            records,
        }
    }
}
