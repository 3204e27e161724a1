//! HitBTC REST client
//!
//! Private endpoints use HTTP basic auth with the key pair; request bodies
//! are form encoded.

use crate::auth::form_encode;
use crate::config::VenueConfig;
use crate::errors::{ExchangeError, Result};
use crate::hitbtc::EXCHANGER_NAME;
use crate::http::HttpsClient;
use crate::traits::ExchangeClient;
use crate::types::*;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bitbot_core::prelude::*;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

/// Levels requested per book side
const BOOK_DEPTH: &str = "10";

pub struct HitbtcClient {
    config: VenueConfig,
    base_url: Url,
    http: HttpsClient,
}

impl HitbtcClient {
    pub fn new(config: VenueConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        let http = HttpsClient::new(config.timeout());
        info!("🔗 HitBTC client created for {}", base_url);
        Ok(Self {
            config,
            base_url,
            http,
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn authorization(&self) -> Result<String> {
        let credentials = self.config.credentials.require()?;
        let token = STANDARD.encode(format!("{}:{}", credentials.key, credentials.secret));
        Ok(format!("Basic {token}"))
    }

    async fn public_get(&self, path: &str, params: &[(&str, &str)]) -> Result<Value> {
        let mut url = self.url(path)?;
        url.query_pairs_mut().extend_pairs(params);
        self.http.request_json("GET", url.as_str(), &[], None).await
    }

    async fn private_get(&self, path: &str) -> Result<Value> {
        let authorization = self.authorization()?;
        let url = self.url(path)?;
        self.http
            .request_json("GET", url.as_str(), &[("Authorization", authorization.as_str())], None)
            .await
    }

    async fn private_post(&self, path: &str, params: &[(&str, &str)]) -> Result<Value> {
        let authorization = self.authorization()?;
        let url = self.url(path)?;
        let body = form_encode(params);
        debug!("HitBTC POST {} {}", path, body);
        self.http
            .request_json(
                "POST",
                url.as_str(),
                &[
                    ("Authorization", authorization.as_str()),
                    ("Content-Type", "application/x-www-form-urlencoded"),
                ],
                Some(body.as_str()),
            )
            .await
    }

    async fn transfer(&self, volume: Fixed, currency: &Currency, direction: &str) -> Result<String> {
        let amount = volume.to_string();
        let response = self
            .private_post(
                "/api/2/account/transfer",
                &[("currency", currency.as_str()), ("amount", amount.as_str()), ("type", direction)],
            )
            .await?;
        parse_id(&response)
    }
}

#[async_trait(?Send)]
impl ExchangeClient for HitbtcClient {
    fn name(&self) -> &str {
        EXCHANGER_NAME
    }

    async fn order_book(&self, pair: &Pair) -> Result<OrderBook> {
        let path = format!("/api/2/public/orderbook/{}", symbol(pair));
        let response = self.public_get(&path, &[("limit", BOOK_DEPTH)]).await?;
        parse_order_book(pair, &response)
    }

    async fn trading_balances(&self) -> Result<BalanceMap> {
        let response = self.private_get("/api/2/trading/balance").await?;
        parse_balances(&response)
    }

    async fn main_balances(&self) -> Result<BalanceMap> {
        let response = self.private_get("/api/2/account/balance").await?;
        parse_balances(&response)
    }

    async fn place_order(&self, request: &OrderRequest) -> Result<OrderConfirmation> {
        let client_order_id = client_order_id();
        let form = order_form(request, &client_order_id);
        let params: Vec<(&str, &str)> = form.iter().map(|(k, v)| (*k, v.as_str())).collect();

        let response = self.private_post("/api/2/order", &params).await?;
        let order_id = response["clientOrderId"]
            .as_str()
            .unwrap_or(&client_order_id)
            .to_string();

        Ok(OrderConfirmation {
            venue: EXCHANGER_NAME.to_string(),
            order_id,
            raw: response,
        })
    }

    async fn withdraw(&self, volume: Fixed, currency: &Currency, destination: &str) -> Result<String> {
        let amount = volume.to_string();
        let response = self
            .private_post(
                "/api/2/account/crypto/withdraw",
                &[("currency", currency.as_str()), ("amount", amount.as_str()), ("address", destination)],
            )
            .await?;
        parse_id(&response)
    }

    async fn transfer_to_main(&self, volume: Fixed, currency: &Currency) -> Result<String> {
        self.transfer(volume, currency, "exchangeToBank").await
    }

    async fn transfer_to_trading(&self, volume: Fixed, currency: &Currency) -> Result<String> {
        self.transfer(volume, currency, "bankToExchange").await
    }

    async fn deposit_address(&self, currency: &Currency) -> Result<String> {
        let path = format!("/api/2/account/crypto/address/{currency}");
        let response = self.private_get(&path).await?;
        response["address"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ExchangeError::MissingAddress(currency.clone()))
    }
}

/// `BTC_USD` -> `BTCUSD`
pub fn symbol(pair: &Pair) -> String {
    format!("{}{}", pair.base, pair.quote)
}

/// Form fields of `POST /api/2/order`; `price` is only sent for limit orders
pub fn order_form(request: &OrderRequest, client_order_id: &str) -> Vec<(&'static str, String)> {
    let mut form = vec![
        ("clientOrderId", client_order_id.to_string()),
        ("symbol", symbol(&request.pair)),
        ("side", request.side.as_lowercase().to_string()),
        ("quantity", request.volume.to_string()),
    ];
    match request.order_type {
        OrderType::Market => form.push(("type", "market".to_string())),
        OrderType::Limit => {
            form.push(("type", "limit".to_string()));
            form.push(("price", request.price.to_string()));
        }
    }
    form
}

/// Decode `{"ask": [{"price", "size"}], "bid": [...]}`
pub fn parse_order_book(pair: &Pair, value: &Value) -> Result<OrderBook> {
    let side = |key: &str| -> Result<Vec<PriceLevel>> {
        value[key]
            .as_array()
            .ok_or_else(|| ExchangeError::InvalidResponse(format!("HitBTC book without `{key}`")))?
            .iter()
            .map(|level| PriceLevel::from_json(&level["price"], &level["size"]))
            .collect()
    };
    Ok(OrderBook::new(EXCHANGER_NAME, pair.clone(), side("bid")?, side("ask")?))
}

/// Decode `[{"currency", "available", "reserved"}]`, keeping the available part
pub fn parse_balances(value: &Value) -> Result<BalanceMap> {
    let entries = value
        .as_array()
        .ok_or_else(|| ExchangeError::InvalidResponse("HitBTC balance is not a list".to_string()))?;

    let mut balances = BalanceMap::with_capacity(entries.len());
    for entry in entries {
        let currency = entry["currency"]
            .as_str()
            .ok_or_else(|| ExchangeError::InvalidResponse("HitBTC balance without currency".to_string()))?;
        balances.insert(Currency::from(currency), Fixed::from_json(&entry["available"])?);
    }
    Ok(balances)
}

fn parse_id(value: &Value) -> Result<String> {
    value["id"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ExchangeError::InvalidResponse(format!("HitBTC response without id: {value}")))
}
