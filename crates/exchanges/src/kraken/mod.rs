//! Kraken integration
//!
//! Kraken speaks its own currency codes (`XXBT`, `ZUSD`, ...) and an
//! RPC-style private API; the adapter drives balance, withdrawal and deposit
//! address lookups through `ExchangeClient::query`.

pub mod auth;
pub mod currencies;
pub mod rest;
pub mod trader;

pub use auth::KrakenSigner;
pub use currencies::KrakenAsset;
pub use rest::KrakenClient;
pub use trader::KrakenTrader;

/// Venue identifier
pub const EXCHANGER_NAME: &str = "kraken";
