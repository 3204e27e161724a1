//! Poloniex REST client
//!
//! Private calls go to `/tradingApi` as a form body carrying `command` and a
//! strictly increasing `nonce`, signed with HMAC-SHA512 in the `Sign` header.

use crate::auth::{form_encode, hmac_sha512};
use crate::config::VenueConfig;
use crate::errors::{ExchangeError, Result};
use crate::http::HttpsClient;
use crate::poloniex::EXCHANGER_NAME;
use crate::traits::ExchangeClient;
use crate::types::*;

use async_trait::async_trait;
use bitbot_core::prelude::*;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};
use url::Url;

const BOOK_DEPTH: &str = "10";

pub struct PoloniexClient {
    config: VenueConfig,
    base_url: Url,
    http: HttpsClient,
    nonce: NonceGenerator,
}

impl PoloniexClient {
    pub fn new(config: VenueConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        let http = HttpsClient::new(config.timeout());
        info!("🔗 Poloniex client created for {}", base_url);
        Ok(Self {
            config,
            base_url,
            http,
            nonce: NonceGenerator::new(),
        })
    }

    /// Sign a form body, returns the hex `Sign` header value
    pub fn sign(&self, body: &str) -> Result<String> {
        let credentials = self.config.credentials.require()?;
        Ok(hex::encode(hmac_sha512(credentials.secret.as_bytes(), body.as_bytes())?))
    }

    async fn public(&self, command: &str, params: &[(&str, &str)]) -> Result<Value> {
        let mut url = self.base_url.join("/public")?;
        url.query_pairs_mut()
            .append_pair("command", command)
            .extend_pairs(params);
        let response = self.http.request_json("GET", url.as_str(), &[], None).await?;
        check_error(response)
    }

    async fn trading_api(&self, command: &str, params: &[(&str, &str)]) -> Result<Value> {
        let credentials = self.config.credentials.require()?;
        let nonce = self.nonce.next().to_string();

        let mut form = vec![("command", command), ("nonce", nonce.as_str())];
        form.extend_from_slice(params);
        let body = form_encode(&form);
        let signature = self.sign(&body)?;
        debug!("Poloniex tradingApi {}", command);

        let url = self.base_url.join("/tradingApi")?;
        let response = self
            .http
            .request_json(
                "POST",
                url.as_str(),
                &[
                    ("Key", credentials.key.as_str()),
                    ("Sign", signature.as_str()),
                    ("Content-Type", "application/x-www-form-urlencoded"),
                ],
                Some(body.as_str()),
            )
            .await?;
        check_error(response)
    }
}

#[async_trait(?Send)]
impl ExchangeClient for PoloniexClient {
    fn name(&self) -> &str {
        EXCHANGER_NAME
    }

    async fn order_book(&self, pair: &Pair) -> Result<OrderBook> {
        let currency_pair = currency_pair(pair);
        let response = self
            .public(
                "returnOrderBook",
                &[("currencyPair", currency_pair.as_str()), ("depth", BOOK_DEPTH)],
            )
            .await?;
        parse_order_book(pair, &response)
    }

    async fn trading_balances(&self) -> Result<BalanceMap> {
        let response = self.trading_api("returnBalances", &[]).await?;
        parse_balances(&response)
    }

    async fn place_order(&self, request: &OrderRequest) -> Result<OrderConfirmation> {
        let currency_pair = currency_pair(&request.pair);
        let rate = request.price.to_string();
        let amount = request.volume.to_string();

        let response = self
            .trading_api(
                request.side.as_lowercase(),
                &[
                    ("currencyPair", currency_pair.as_str()),
                    ("rate", rate.as_str()),
                    ("amount", amount.as_str()),
                ],
            )
            .await?;

        let order_id = match &response["orderNumber"] {
            Value::String(id) => id.clone(),
            Value::Number(id) => id.to_string(),
            _ => {
                return Err(ExchangeError::InvalidResponse(format!(
                    "Poloniex order without orderNumber: {response}"
                )));
            }
        };

        Ok(OrderConfirmation {
            venue: EXCHANGER_NAME.to_string(),
            order_id,
            raw: response,
        })
    }

    async fn withdraw(&self, volume: Fixed, currency: &Currency, destination: &str) -> Result<String> {
        let form = withdraw_form(volume, currency, destination);
        let params: Vec<(&str, &str)> = form.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let response = self.trading_api("withdraw", &params).await?;

        response["response"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ExchangeError::InvalidResponse(format!("Poloniex withdraw reply: {response}")))
    }

    async fn deposit_addresses(&self) -> Result<HashMap<Currency, String>> {
        let response = self.trading_api("returnDepositAddresses", &[]).await?;
        parse_deposit_addresses(&response)
    }
}

/// Standard code to Poloniex code
pub fn venue_currency(currency: &Currency) -> Currency {
    match currency.as_str() {
        "USD" => Currency::from("USDT"),
        _ => currency.clone(),
    }
}

/// Poloniex code to standard code
pub fn standard_currency(code: &str) -> Currency {
    match code {
        "USDT" => Currency::from("USD"),
        other => Currency::from(other),
    }
}

/// Parameters of the `withdraw` command, in Poloniex currency codes
pub fn withdraw_form(volume: Fixed, currency: &Currency, destination: &str) -> Vec<(&'static str, String)> {
    vec![
        ("currency", venue_currency(currency).to_string()),
        ("amount", volume.to_string()),
        ("address", destination.to_string()),
    ]
}

/// `BTC_USD` -> `USDT_BTC`
pub fn currency_pair(pair: &Pair) -> String {
    format!("{}_{}", venue_currency(&pair.quote), venue_currency(&pair.base))
}

/// Poloniex answers some failures with status 200 and `{"error": "..."}`
fn check_error(value: Value) -> Result<Value> {
    match value.get("error").and_then(Value::as_str) {
        Some(message) => Err(ExchangeError::Rejected {
            venue: EXCHANGER_NAME.to_string(),
            message: message.to_string(),
        }),
        None => Ok(value),
    }
}

/// Decode `{"asks": [[price, volume]], "bids": [...]}`
pub fn parse_order_book(pair: &Pair, value: &Value) -> Result<OrderBook> {
    let side = |key: &str| -> Result<Vec<PriceLevel>> {
        value[key]
            .as_array()
            .ok_or_else(|| ExchangeError::InvalidResponse(format!("Poloniex book without `{key}`")))?
            .iter()
            .map(|level| PriceLevel::from_json(&level[0], &level[1]))
            .collect()
    };
    Ok(OrderBook::new(EXCHANGER_NAME, pair.clone(), side("bids")?, side("asks")?))
}

/// Decode `{"BTC": "0.59", "USDT": "12.0", ...}`
pub fn parse_balances(value: &Value) -> Result<BalanceMap> {
    let entries = value
        .as_object()
        .ok_or_else(|| ExchangeError::InvalidResponse("Poloniex balances is not an object".to_string()))?;

    entries
        .iter()
        .map(|(code, amount)| -> Result<(Currency, Fixed)> {
            Ok((standard_currency(code), Fixed::from_json(amount)?))
        })
        .collect()
}

/// Decode `{"BTC": "1Addr...", ...}`
pub fn parse_deposit_addresses(value: &Value) -> Result<HashMap<Currency, String>> {
    let entries = value
        .as_object()
        .ok_or_else(|| ExchangeError::InvalidResponse("Poloniex addresses is not an object".to_string()))?;

    Ok(entries
        .iter()
        .filter_map(|(code, address)| address.as_str().map(|a| (standard_currency(code), a.to_string())))
        .collect())
}
