//! Kraken REST client

use crate::auth::form_encode;
use crate::config::VenueConfig;
use crate::errors::{ExchangeError, Result};
use crate::http::HttpsClient;
use crate::kraken::auth::KrakenSigner;
use crate::kraken::{EXCHANGER_NAME, currencies};
use crate::traits::ExchangeClient;
use crate::types::*;

use async_trait::async_trait;
use bitbot_core::prelude::*;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

const BOOK_DEPTH: &str = "10";

pub struct KrakenClient {
    base_url: Url,
    http: HttpsClient,
    signer: Option<KrakenSigner>,
    nonce: NonceGenerator,
}

impl KrakenClient {
    /// Without credentials only public endpoints are available
    pub fn new(config: VenueConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        let http = HttpsClient::new(config.timeout());
        let signer = if config.credentials.is_valid() {
            Some(KrakenSigner::new(config.credentials)?)
        } else {
            None
        };
        info!("🔗 Kraken client created for {} (private API: {})", base_url, signer.is_some());

        Ok(Self {
            base_url,
            http,
            signer,
            nonce: NonceGenerator::new(),
        })
    }
}

#[async_trait(?Send)]
impl ExchangeClient for KrakenClient {
    fn name(&self) -> &str {
        EXCHANGER_NAME
    }

    async fn order_book(&self, pair: &Pair) -> Result<OrderBook> {
        let pair_name = currencies::pair_name(pair)?;
        let mut url = self.base_url.join("/0/public/Depth")?;
        url.query_pairs_mut()
            .append_pair("pair", &pair_name)
            .append_pair("count", BOOK_DEPTH);

        let response = self.http.request_json("GET", url.as_str(), &[], None).await?;
        parse_order_book(pair, &unwrap_result(response)?)
    }

    async fn place_order(&self, request: &OrderRequest) -> Result<OrderConfirmation> {
        let pair_name = currencies::pair_name(&request.pair)?;
        let volume = request.volume.to_string();
        let price = request.price.to_string();

        let mut params = vec![
            ("pair", pair_name.as_str()),
            ("type", request.side.as_lowercase()),
            ("volume", volume.as_str()),
        ];
        match request.order_type {
            OrderType::Market => params.push(("ordertype", "market")),
            OrderType::Limit => {
                params.push(("ordertype", "limit"));
                params.push(("price", price.as_str()));
            }
        }

        let result = self.query("AddOrder", &params).await?;
        let order_id = result["txid"][0]
            .as_str()
            .ok_or_else(|| ExchangeError::InvalidResponse(format!("Kraken AddOrder without txid: {result}")))?
            .to_string();

        Ok(OrderConfirmation {
            venue: EXCHANGER_NAME.to_string(),
            order_id,
            raw: result,
        })
    }

    /// Signed call to `/0/private/<method>`, returns the `result` member
    async fn query(&self, method: &str, params: &[(&str, &str)]) -> Result<Value> {
        let signer = self.signer.as_ref().ok_or(ExchangeError::InvalidCredentials)?;
        let nonce = self.nonce.next().to_string();

        let mut form = vec![("nonce", nonce.as_str())];
        form.extend_from_slice(params);
        let body = form_encode(&form);

        let path = format!("/0/private/{method}");
        let signature = signer.sign(&path, &nonce, &body)?;
        let url = self.base_url.join(&path)?;
        debug!("Kraken private {}", method);

        let response = self
            .http
            .request_json(
                "POST",
                url.as_str(),
                &[
                    ("API-Key", signer.api_key()),
                    ("API-Sign", signature.as_str()),
                    ("Content-Type", "application/x-www-form-urlencoded"),
                ],
                Some(body.as_str()),
            )
            .await?;
        unwrap_result(response)
    }
}

/// Every reply is `{"error": [...], "result": ...}`
pub fn unwrap_result(mut value: Value) -> Result<Value> {
    if let Some(errors) = value["error"].as_array() {
        if !errors.is_empty() {
            let message = errors
                .iter()
                .map(|e| e.as_str().map(str::to_string).unwrap_or_else(|| e.to_string()))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ExchangeError::Rejected {
                venue: EXCHANGER_NAME.to_string(),
                message,
            });
        }
    }

    match value.get_mut("result") {
        Some(result) => Ok(result.take()),
        None => Err(ExchangeError::InvalidResponse(format!("Kraken reply without result: {value}"))),
    }
}

/// Decode a Depth result, keyed by Kraken's own pair name
pub fn parse_order_book(pair: &Pair, result: &Value) -> Result<OrderBook> {
    let book = result
        .as_object()
        .and_then(|pairs| pairs.values().next())
        .ok_or_else(|| ExchangeError::InvalidResponse(format!("Kraken Depth without book for {pair}")))?;

    let side = |key: &str| -> Result<Vec<PriceLevel>> {
        book[key]
            .as_array()
            .ok_or_else(|| ExchangeError::InvalidResponse(format!("Kraken book without `{key}`")))?
            .iter()
            .map(|level| PriceLevel::from_json(&level[0], &level[1]))
            .collect()
    };
    Ok(OrderBook::new(EXCHANGER_NAME, pair.clone(), side("bids")?, side("asks")?))
}

/// Decode a Balance result into standard codes, skipping unknown assets
pub fn parse_balances(result: &Value) -> Result<BalanceMap> {
    let entries = result
        .as_object()
        .ok_or_else(|| ExchangeError::InvalidResponse("Kraken balance is not an object".to_string()))?;

    let mut balances = BalanceMap::new();
    for (code, amount) in entries {
        match currencies::from_asset_code(code) {
            Some(currency) => {
                balances.insert(currency, Fixed::from_json(amount)?);
            }
            None => debug!("Kraken: ignoring balance of unmapped asset {}", code),
        }
    }
    Ok(balances)
}
