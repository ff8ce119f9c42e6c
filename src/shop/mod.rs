//! ZombsRoyale shop API client

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::fetch::{FetchOptions, HttpFetcher};
use crate::traits::ShopSource;

/// Shop endpoint prefix; the section name is appended
pub const DEFAULT_API_BASE: &str = "https://zombsroyale.io/api/shop/available?userKey&sections=";

#[derive(Clone)]
pub struct ZombsShopApi {
    fetcher: HttpFetcher,
    base_url: String,
    options: FetchOptions,
}

impl ZombsShopApi {
    pub fn new(fetcher: HttpFetcher, base_url: impl Into<String>, options: FetchOptions) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            options,
        }
    }

    fn section_url(&self, section: &str) -> String {
        format!("{}{}", self.base_url, section)
    }

    async fn section(&self, section: &str) -> Option<Value> {
        info!("Fetching shop section {}", section);
        self.fetcher
            .get_json(&self.section_url(section), None, None, &self.options)
            .await
    }
}

#[async_trait]
impl ShopSource for ZombsShopApi {
    async fn timed_deals(&self) -> Option<Value> {
        self.section("timedDeals").await
    }

    async fn catalog(&self) -> Option<Value> {
        self.section("items").await
    }
}
