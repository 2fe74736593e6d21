// Steam Community Market HTTP client.
// One GET per lookup against the priceoverview endpoint; no retry, no backoff.

use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, USER_AGENT},
};
use rust_decimal::Decimal;

use crate::error::{CaseworthError, Result};
use crate::valuation::PriceSource;

use super::types::{PriceOverview, parse_price};

const PRICE_OVERVIEW_URL: &str = "https://steamcommunity.com/market/priceoverview/";

/// EUR price listings.
const CURRENCY_EUR: &str = "3";
/// CS:GO app id.
const APP_ID: &str = "730";

const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Market price lookup client.
pub struct MarketClient {
    client: Client,
}

impl MarketClient {
    /// Create a new market client.
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("caseworth"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(CaseworthError::Market)?;

        Ok(Self { client })
    }

    /// Fetch the current EUR price for one item by its market hash name.
    pub async fn fetch_price(&self, item_name: &str) -> Result<Decimal> {
        let response = self
            .client
            .get(PRICE_OVERVIEW_URL)
            .query(&[
                ("currency", CURRENCY_EUR),
                ("appid", APP_ID),
                ("market_hash_name", item_name),
            ])
            .send()
            .await
            .map_err(CaseworthError::Market)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CaseworthError::MarketStatus {
                item: item_name.to_string(),
                status,
            });
        }

        let overview: PriceOverview = response.json().await.map_err(CaseworthError::Market)?;

        let raw = overview
            .price_field()
            .filter(|_| overview.success)
            .ok_or_else(|| CaseworthError::MissingPrice(item_name.to_string()))?;

        parse_price(raw).ok_or_else(|| CaseworthError::UnparsablePrice {
            item: item_name.to_string(),
            raw: raw.to_string(),
        })
    }
}

impl PriceSource for MarketClient {
    fn fetch(
        &self,
        item_name: &str,
    ) -> impl std::future::Future<Output = Result<Decimal>> + Send {
        self.fetch_price(item_name)
    }
}
