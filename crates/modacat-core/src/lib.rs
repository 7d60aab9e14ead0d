pub mod brands;
pub mod domain;
pub mod product_type;

pub use brands::BrandLexicon;
pub use domain::MarketDomain;
pub use product_type::classify_product_type;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read brands file {path}: {source}")]
    BrandsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse brands file: {0}")]
    BrandsFileParse(#[from] serde_yaml::Error),

    #[error("unsupported market domain: {0}")]
    UnsupportedDomain(String),

    #[error("validation error: {0}")]
    Validation(String),
}
