//! # Bitbot Exchange Integrations
//!
//! Venue clients and the uniform trading contract used by the bot.
//!
//! ## Architecture
//!
//! - **`ExchangeClient`** - one REST client per venue (order books, balances,
//!   orders, transfers, deposit addresses)
//! - **`Trader`** - one adapter per trading venue hiding account-model quirks
//! - **`BalanceSettlementMonitor`** - bounded polling until transferred funds arrive
//! - **`AddressCache`** - deposit addresses resolved once per trader
//! - **monoio-based HTTPS** - single-threaded async with rustls

pub mod address_cache;
pub mod auth;
pub mod config;
pub mod errors;
pub mod http;
pub mod settlement;
pub mod traits;
pub mod types;

#[cfg(feature = "bitfinex")]
pub mod bitfinex;
#[cfg(feature = "hitbtc")]
pub mod hitbtc;
#[cfg(feature = "kraken")]
pub mod kraken;
#[cfg(feature = "poloniex")]
pub mod poloniex;

pub use address_cache::AddressCache;
pub use auth::Credentials;
pub use config::{SettlementConfig, VenueConfig};
pub use errors::{ExchangeError, Result, ResultExt, TransferLeg};
pub use http::{HttpResponse, HttpsClient};
pub use settlement::BalanceSettlementMonitor;
pub use traits::{ExchangeClient, Trader};
pub use types::*;

#[cfg(feature = "bitfinex")]
pub use bitfinex::BitfinexClient;
#[cfg(feature = "hitbtc")]
pub use hitbtc::{HitbtcClient, HitbtcTrader};
#[cfg(feature = "kraken")]
pub use kraken::{KrakenClient, KrakenTrader};
#[cfg(feature = "poloniex")]
pub use poloniex::{PoloniexClient, PoloniexTrader};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::address_cache::AddressCache;
    pub use crate::auth::Credentials;
    pub use crate::config::{SettlementConfig, VenueConfig};
    pub use crate::errors::{ExchangeError, Result, ResultExt, TransferLeg};
    pub use crate::settlement::BalanceSettlementMonitor;
    pub use crate::traits::{ExchangeClient, Trader};
    pub use crate::types::*;
    pub use bitbot_core::prelude::*;
}
