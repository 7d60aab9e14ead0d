pub mod catalog;
pub mod client;
mod demo;
pub mod detail;
pub mod error;
pub mod extract;
pub mod price;
mod sku;
pub mod types;

pub use catalog::{CatalogGather, CatalogParser, DEFAULT_CONCURRENCY};
pub use client::{PageClient, PageClientConfig};
pub use detail::parse_product_page;
pub use error::ScrapeError;
pub use extract::extract;
pub use price::parse_price;
pub use types::{CatalogPage, CatalogSource, ProductDetails, ProductRecord};
