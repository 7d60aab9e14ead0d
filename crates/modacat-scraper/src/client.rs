//! HTTP client for storefront pages.
//!
//! Fetches are paced with a randomized delay so bursts of page requests
//! resemble a human browsing session. A single 429 triggers one long
//! randomized backoff and one retry; a second 429 is a typed error.

use std::time::Duration;

use modacat_core::domain::MarketDomain;
use reqwest::{Client, StatusCode};

use crate::error::ScrapeError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Tunables for [`PageClient`]. Defaults match polite production pacing;
/// tests shrink the delays and point `base_url` at a local server.
pub struct PageClientConfig {
    /// Overrides the market host when set.
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    /// Min/max pre-request delay in milliseconds.
    pub humanize_delay_ms: (u64, u64),
    /// Min/max backoff before the single 429 retry, in milliseconds.
    pub rate_limit_backoff_ms: (u64, u64),
}

impl Default for PageClientConfig {
    fn default() -> Self {
        PageClientConfig {
            base_url: None,
            timeout_secs: 30,
            humanize_delay_ms: (500, 1500),
            rate_limit_backoff_ms: (5000, 10_000),
        }
    }
}

/// HTTP client bound to one storefront market.
pub struct PageClient {
    client: Client,
    domain: MarketDomain,
    base_url: String,
    humanize_delay_ms: (u64, u64),
    rate_limit_backoff_ms: (u64, u64),
}

impl PageClient {
    /// Creates a client with default pacing for `domain`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(domain: MarketDomain) -> Result<Self, ScrapeError> {
        Self::with_config(domain, PageClientConfig::default())
    }

    /// Creates a client with explicit pacing and host configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_config(domain: MarketDomain, config: PageClientConfig) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            domain,
            base_url: config
                .base_url
                .unwrap_or_else(|| domain.host().to_owned()),
            humanize_delay_ms: config.humanize_delay_ms,
            rate_limit_backoff_ms: config.rate_limit_backoff_ms,
        })
    }

    #[must_use]
    pub fn domain(&self) -> MarketDomain {
        self.domain
    }

    /// Search-results URL for `query`. Pages are 1-based; page 1 carries no
    /// page parameter, matching what the storefront links itself.
    ///
    /// A `base_url` override that does not parse still gets a properly
    /// encoded query string appended verbatim to the base.
    #[must_use]
    pub fn search_url(&self, query: &str, page: u32) -> String {
        let base = format!("{}/catalogsearch/result/", self.base_url);
        match reqwest::Url::parse(&base) {
            Ok(mut url) => {
                Self::append_search_params(&mut url, query, page);
                url.into()
            }
            Err(_) => {
                let mut scratch =
                    reqwest::Url::parse("http://query.invalid/").expect("valid URL literal");
                Self::append_search_params(&mut scratch, query, page);
                format!("{base}?{}", scratch.query().unwrap_or(""))
            }
        }
    }

    fn append_search_params(url: &mut reqwest::Url, query: &str, page: u32) {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("q", query).append_pair("submit", "y");
        if page > 1 {
            pairs.append_pair("page", &page.to_string());
        }
    }

    /// Fetches one search-results page.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`PageClient::fetch_page`].
    pub async fn fetch_search_page(&self, query: &str, page: u32) -> Result<String, ScrapeError> {
        let url = self.search_url(query, page);
        tracing::debug!(%url, "fetching search page");
        self.fetch_page(&url).await
    }

    /// Fetches `url` and returns the response body.
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::RateLimited`] — 429 on both the first attempt and
    ///   the single retry.
    /// - [`ScrapeError::UnexpectedStatus`] — any other non-2xx status.
    /// - [`ScrapeError::Http`] — network, TLS, or body-read failure.
    pub async fn fetch_page(&self, url: &str) -> Result<String, ScrapeError> {
        self.humanize().await;

        let mut response = self.client.get(url).send().await?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            let (lo, hi) = self.rate_limit_backoff_ms;
            let backoff = rand::random_range(lo..=hi);
            tracing::warn!(url, backoff_ms = backoff, "rate limited; retrying once");
            tokio::time::sleep(Duration::from_millis(backoff)).await;

            response = self.client.get(url).send().await?;
            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                return Err(ScrapeError::RateLimited {
                    url: url.to_owned(),
                });
            }
        }

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }
        Ok(response.text().await?)
    }

    async fn humanize(&self) {
        let (lo, hi) = self.humanize_delay_ms;
        if hi == 0 {
            return;
        }
        let ms = rand::random_range(lo..=hi);
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}
