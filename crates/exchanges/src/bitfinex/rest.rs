//! Bitfinex public REST (v2) client

use crate::bitfinex::EXCHANGER_NAME;
use crate::config::VenueConfig;
use crate::errors::{ExchangeError, Result};
use crate::http::HttpsClient;
use crate::traits::ExchangeClient;
use crate::types::*;

use async_trait::async_trait;
use bitbot_core::Fixed;
use serde_json::Value;
use tracing::info;
use url::Url;

const BOOK_DEPTH: &str = "25";

pub struct BitfinexClient {
    base_url: Url,
    http: HttpsClient,
}

impl BitfinexClient {
    pub fn new(config: VenueConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        info!("🔗 Bitfinex client created for {}", base_url);
        Ok(Self {
            base_url,
            http: HttpsClient::new(config.timeout()),
        })
    }
}

#[async_trait(?Send)]
impl ExchangeClient for BitfinexClient {
    fn name(&self) -> &str {
        EXCHANGER_NAME
    }

    async fn order_book(&self, pair: &Pair) -> Result<OrderBook> {
        let mut url = self.base_url.join(&format!("/v2/book/{}/P0", symbol(pair)))?;
        url.query_pairs_mut().append_pair("len", BOOK_DEPTH);
        let response = self.http.request_json("GET", url.as_str(), &[], None).await?;
        parse_order_book(pair, &response)
    }
}

/// `BTC_USD` -> `tBTCUSD`
pub fn symbol(pair: &Pair) -> String {
    format!("t{}{}", pair.base, pair.quote)
}

/// Decode `[[price, count, amount], ...]`; positive amounts are bids,
/// negative amounts are asks
pub fn parse_order_book(pair: &Pair, value: &Value) -> Result<OrderBook> {
    let entries = value
        .as_array()
        .ok_or_else(|| ExchangeError::InvalidResponse("Bitfinex book is not a list".to_string()))?;

    let mut bids = Vec::new();
    let mut asks = Vec::new();
    for entry in entries {
        let price = Fixed::from_json(&entry[0])?;
        let amount = Fixed::from_json(&entry[2])?;
        if amount.is_negative() {
            asks.push(PriceLevel::new(price, amount.abs())?);
        } else {
            bids.push(PriceLevel::new(price, amount)?);
        }
    }

    Ok(OrderBook::new(EXCHANGER_NAME, pair.clone(), bids, asks))
}
