//! Catalog orchestration: search-page extraction plus bounded-concurrency
//! detail-page fan-out.

use std::sync::Arc;

use futures::future::join_all;
use modacat_core::brands::BrandLexicon;
use modacat_core::domain::{MarketDomain, PRODUCT_PATH_MARKER};
use modacat_core::product_type::classify_product_type;
use tokio::sync::Semaphore;

use crate::client::PageClient;
use crate::demo;
use crate::detail;
use crate::error::ScrapeError;
use crate::extract;
use crate::types::{CatalogPage, CatalogSource, ProductDetails, ProductRecord};

/// Detail pages fetched in flight at once, unless the caller overrides it.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// A gathered catalog: full detail records plus their provenance.
#[derive(Debug)]
pub struct CatalogGather {
    pub source: CatalogSource,
    pub items: Vec<ProductDetails>,
}

/// High-level entry point tying the client, extraction, and detail parsing
/// together for one storefront market.
pub struct CatalogParser {
    client: PageClient,
    lexicon: BrandLexicon,
}

impl CatalogParser {
    /// Parser for `domain` with default pacing and the builtin brand
    /// lexicon.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the HTTP client cannot be built.
    pub fn new(domain: MarketDomain) -> Result<Self, ScrapeError> {
        Ok(Self::with_parts(
            PageClient::new(domain)?,
            BrandLexicon::default(),
        ))
    }

    /// Parser from explicit parts, used to inject test clients and custom
    /// lexicons.
    #[must_use]
    pub fn with_parts(client: PageClient, lexicon: BrandLexicon) -> Self {
        CatalogParser { client, lexicon }
    }

    #[must_use]
    pub fn domain(&self) -> MarketDomain {
        self.client.domain()
    }

    /// Search the catalog and extract up to `limit` products.
    ///
    /// Never fails: when the fetch errors out or extraction comes up empty,
    /// the result is a demo catalog tagged [`CatalogSource::Demo`].
    pub async fn search(&self, query: &str, limit: usize) -> CatalogPage {
        match self.client.fetch_search_page(query, 1).await {
            Ok(body) => {
                let records = extract::extract(&body, limit, self.domain(), &self.lexicon);
                if records.is_empty() {
                    tracing::warn!(query, "extraction produced nothing; serving demo catalog");
                    CatalogPage::demo(demo::demo_records(query, limit, self.domain()))
                } else {
                    tracing::debug!(query, count = records.len(), "live catalog extracted");
                    CatalogPage::live(records)
                }
            }
            Err(error) => {
                tracing::warn!(query, %error, "search fetch failed; serving demo catalog");
                CatalogPage::demo(demo::demo_records(query, limit, self.domain()))
            }
        }
    }

    /// Fetch and parse one detail page. Fetch and parse failures both
    /// collapse to `None` so a single bad page never fails a gather.
    pub async fn product_details(&self, url: &str) -> Option<ProductDetails> {
        match self.client.fetch_page(url).await {
            Ok(body) => {
                let details = detail::parse_product_page(&body, url, self.domain(), &self.lexicon);
                if details.is_none() {
                    tracing::debug!(url, "detail page yielded no product");
                }
                details
            }
            Err(error) => {
                tracing::warn!(url, %error, "detail fetch failed");
                None
            }
        }
    }

    /// Search, then fetch every extracted product's detail page with at
    /// most `concurrency` requests in flight.
    ///
    /// Results come back in listing order regardless of which fetch
    /// finished first; unparseable pages are dropped. A demo search result
    /// is converted directly without fetching its synthetic URLs.
    pub async fn gather_catalog(
        &self,
        query: &str,
        limit: usize,
        concurrency: usize,
    ) -> CatalogGather {
        let page = self.search(query, limit).await;

        if page.source == CatalogSource::Demo {
            return CatalogGather {
                source: CatalogSource::Demo,
                items: page.records.into_iter().map(details_from_record).collect(),
            };
        }

        let urls: Vec<String> = page
            .records
            .iter()
            .filter(|r| r.url.starts_with("http") && r.url.contains(PRODUCT_PATH_MARKER))
            .map(|r| r.url.clone())
            .collect();
        tracing::debug!(query, urls = urls.len(), concurrency, "gathering detail pages");

        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let fetches = urls.iter().map(|url| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let _permit = semaphore.acquire().await.ok()?;
                self.product_details(url).await
            }
        });

        // join_all preserves submission order, which is listing order.
        let mut items: Vec<ProductDetails> = join_all(fetches).await.into_iter().flatten().collect();
        items.truncate(limit);

        CatalogGather {
            source: CatalogSource::Live,
            items,
        }
    }
}

/// Promote a catalog record to the detail shape without a page fetch.
fn details_from_record(record: ProductRecord) -> ProductDetails {
    let product_type = classify_product_type(&record.name).map(str::to_owned);
    ProductDetails {
        sku: record.sku,
        name: record.name,
        brand: record.brand,
        price: record.price,
        old_price: record.old_price,
        url: record.url,
        image_url: record.image_url,
        image_urls: record.image_urls,
        description: None,
        product_type,
    }
}
