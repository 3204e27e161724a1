//! Venue-agnostic market and trading types
//!
//! Venue modules translate `Pair` and `Currency` into their own symbols and
//! decode their wire formats into `OrderBook`; nothing outside a venue module
//! sees a venue-specific code.

use bitbot_core::prelude::*;
use serde_json::Value;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::{ExchangeError, Result};

/// Standard currency code, always upper case (`BTC`, `USD`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Currency {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for Currency {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

impl Borrow<str> for Currency {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Venue-scoped balances, always freshly queried
pub type BalanceMap = HashMap<Currency, Fixed>;

/// Narrow a venue's full balance listing to `requested`
///
/// The listing must name every currency the venue supports, so a requested
/// currency missing from it is `UnsupportedCurrency`.
pub fn select_balances(listed: &BalanceMap, requested: &[Currency]) -> Result<BalanceMap> {
    requested
        .iter()
        .map(|currency| match listed.get(currency) {
            Some(amount) => Ok((currency.clone(), *amount)),
            None => Err(ExchangeError::UnsupportedCurrency(currency.clone())),
        })
        .collect()
}

/// Currency pair, written `BASE_QUOTE`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair {
    pub base: Currency,
    pub quote: Currency,
}

impl Pair {
    pub fn new(base: impl Into<Currency>, quote: impl Into<Currency>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }
}

impl FromStr for Pair {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(['_', '/']) {
            Some((base, quote))
                if !base.trim().is_empty() && !quote.trim().is_empty() && !quote.contains(['_', '/']) =>
            {
                Ok(Self::new(base, quote))
            }
            _ => Err(ExchangeError::ConfigurationError(format!(
                "invalid pair `{s}`, expected BASE_QUOTE"
            ))),
        }
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.base, self.quote)
    }
}

/// One price level of a book side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceLevel {
    price: Fixed,
    volume: Fixed,
}

impl PriceLevel {
    /// Requires `price > 0` and `volume >= 0`
    pub fn new(price: Fixed, volume: Fixed) -> Result<Self> {
        if !price.is_positive() {
            return Err(ExchangeError::InvalidResponse(format!(
                "price level with non-positive price {price}"
            )));
        }
        if volume.is_negative() {
            return Err(ExchangeError::InvalidResponse(format!(
                "price level with negative volume {volume}"
            )));
        }
        Ok(Self { price, volume })
    }

    /// Decode a level from two JSON values (string or number each)
    pub fn from_json(price: &Value, volume: &Value) -> Result<Self> {
        Self::new(Fixed::from_json(price)?, Fixed::from_json(volume)?)
    }

    pub fn price(&self) -> Fixed {
        self.price
    }

    pub fn volume(&self) -> Fixed {
        self.volume
    }
}

/// Point-in-time snapshot of one venue's book for one pair
///
/// Bids are sorted highest first and asks lowest first on construction, so
/// `bids()[0]` / `asks()[0]` are always the best levels regardless of the
/// order the venue sent them in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderBook {
    exchanger: String,
    pair: Pair,
    bids: Vec<PriceLevel>,
    asks: Vec<PriceLevel>,
    fetched_at: Timestamp,
}

impl OrderBook {
    pub fn new(
        exchanger: impl Into<String>,
        pair: Pair,
        mut bids: Vec<PriceLevel>,
        mut asks: Vec<PriceLevel>,
    ) -> Self {
        bids.sort_by(|a, b| b.price.cmp(&a.price));
        asks.sort_by(|a, b| a.price.cmp(&b.price));
        Self {
            exchanger: exchanger.into(),
            pair,
            bids,
            asks,
            fetched_at: Timestamp::now(),
        }
    }

    pub fn exchanger(&self) -> &str {
        &self.exchanger
    }

    pub fn pair(&self) -> &Pair {
        &self.pair
    }

    pub fn bids(&self) -> &[PriceLevel] {
        &self.bids
    }

    pub fn asks(&self) -> &[PriceLevel] {
        &self.asks
    }

    pub fn fetched_at(&self) -> Timestamp {
        self.fetched_at
    }

    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.asks.first()
    }

    /// `(ask / bid - 1) * 100`, `None` when either side is empty
    pub fn spread_percent(&self) -> Option<Fixed> {
        let bid = self.best_bid()?;
        let ask = self.best_ask()?;
        ask.price().percent_above(bid.price()).ok()
    }
}

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Lower-case wire form shared by most venues
    pub fn as_lowercase(&self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    Market,
    Limit,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Limit => write!(f, "LIMIT"),
        }
    }
}

/// Order as handed to an `ExchangeClient`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    pub side: OrderSide,
    pub pair: Pair,
    pub price: Fixed,
    pub volume: Fixed,
    pub order_type: OrderType,
}

impl OrderRequest {
    /// Build a request, rejecting non-positive price or volume
    pub fn new(side: OrderSide, pair: Pair, price: Fixed, volume: Fixed, order_type: OrderType) -> Result<Self> {
        if !price.is_positive() {
            return Err(ExchangeError::InvalidOrder(format!("price must be positive, got {price}")));
        }
        if !volume.is_positive() {
            return Err(ExchangeError::InvalidOrder(format!("volume must be positive, got {volume}")));
        }
        Ok(Self {
            side,
            pair,
            price,
            volume,
            order_type,
        })
    }
}

/// Venue acknowledgement of an accepted order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub venue: String,
    pub order_id: String,
    /// Full venue response, kept for the operator log
    pub raw: Value,
}
