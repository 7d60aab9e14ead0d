//! Storefront domain configuration for the supported Lamoda markets.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Host serving product imagery for every market. Images on other hosts are
/// page chrome (icons, banners) and are never product photos.
pub const IMAGE_CDN_HOST: &str = "lmcdn.ru";

/// Base used to absolutize root-relative image paths from embedded JSON.
pub const IMAGE_CDN_BASE: &str = "https://a.lmcdn.ru";

/// File extensions accepted as product imagery.
pub const IMAGE_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".webp"];

/// Path marker identifying a product detail page, e.g.
/// `/p/mp002xw0zg9n/clothes-terranova-bryuki/`.
pub const PRODUCT_PATH_MARKER: &str = "/p/";

/// A Lamoda storefront market. Each market has its own host and displays
/// prices in its own currency, always in whole native units with a space
/// as the thousands separator (`15 990 ₸`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketDomain {
    /// lamoda.kz — prices in tenge (₸).
    Kz,
    /// lamoda.ru — prices in rubles (₽).
    Ru,
    /// lamoda.by — prices in Belarusian rubles (р.).
    By,
}

impl MarketDomain {
    /// Storefront origin, no trailing slash.
    #[must_use]
    pub fn host(self) -> &'static str {
        match self {
            MarketDomain::Kz => "https://www.lamoda.kz",
            MarketDomain::Ru => "https://www.lamoda.ru",
            MarketDomain::By => "https://www.lamoda.by",
        }
    }

    /// Currency glyph as rendered on product cards.
    #[must_use]
    pub fn currency_glyph(self) -> &'static str {
        match self {
            MarketDomain::Kz => "₸",
            MarketDomain::Ru => "₽",
            MarketDomain::By => "р.",
        }
    }

    /// Two-letter market code, used in synthesized SKUs.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            MarketDomain::Kz => "KZ",
            MarketDomain::Ru => "RU",
            MarketDomain::By => "BY",
        }
    }

    /// Resolve a possibly-relative href against this market's host.
    ///
    /// `//host/path` gets an `https:` scheme, `/path` is joined to the host,
    /// absolute URLs pass through unchanged. Anything else returns `None`.
    #[must_use]
    pub fn absolutize(self, href: &str) -> Option<String> {
        if href.starts_with("http://") || href.starts_with("https://") {
            Some(href.to_owned())
        } else if let Some(rest) = href.strip_prefix("//") {
            Some(format!("https://{rest}"))
        } else if href.starts_with('/') {
            Some(format!("{}{href}", self.host()))
        } else {
            None
        }
    }
}

impl std::fmt::Display for MarketDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarketDomain::Kz => write!(f, "kz"),
            MarketDomain::Ru => write!(f, "ru"),
            MarketDomain::By => write!(f, "by"),
        }
    }
}

impl FromStr for MarketDomain {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kz" => Ok(MarketDomain::Kz),
            "ru" => Ok(MarketDomain::Ru),
            "by" => Ok(MarketDomain::By),
            other => Err(ConfigError::UnsupportedDomain(other.to_owned())),
        }
    }
}

/// Returns `true` when `url` points at product imagery: hosted on the image
/// CDN and carrying a known image extension.
#[must_use]
pub fn is_product_image_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.contains(IMAGE_CDN_HOST) && IMAGE_EXTENSIONS.iter().any(|ext| lower.contains(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_parses_case_insensitively() {
        assert_eq!("KZ".parse::<MarketDomain>().unwrap(), MarketDomain::Kz);
        assert_eq!("ru".parse::<MarketDomain>().unwrap(), MarketDomain::Ru);
    }

    #[test]
    fn domain_rejects_unknown_market() {
        let err = "ua".parse::<MarketDomain>().unwrap_err();
        assert!(err.to_string().contains("unsupported market domain"));
    }

    #[test]
    fn absolutize_protocol_relative() {
        let url = MarketDomain::Kz.absolutize("//a.lmcdn.ru/img/1.jpg");
        assert_eq!(url.as_deref(), Some("https://a.lmcdn.ru/img/1.jpg"));
    }

    #[test]
    fn absolutize_root_relative_joins_host() {
        let url = MarketDomain::Kz.absolutize("/p/ab12cd34ef56/shoes/");
        assert_eq!(
            url.as_deref(),
            Some("https://www.lamoda.kz/p/ab12cd34ef56/shoes/")
        );
    }

    #[test]
    fn absolutize_rejects_fragments() {
        assert_eq!(MarketDomain::Ru.absolutize("javascript:void(0)"), None);
    }

    #[test]
    fn image_url_filter_requires_cdn_and_extension() {
        assert!(is_product_image_url("https://a.lmcdn.ru/img600x866/R/T/x.jpg"));
        assert!(!is_product_image_url("https://a.lmcdn.ru/sprite.svg"));
        assert!(!is_product_image_url("https://cdn.other.com/photo.jpg"));
    }
}
