//! HitBTC integration (REST API v2)
//!
//! Funds sit in either the bank (main) account or the exchange (trading)
//! account. Withdrawals leave from the bank account and deposits land there,
//! so the trader moves balances between the two around every withdrawal.

pub mod rest;
pub mod trader;

pub use rest::HitbtcClient;
pub use trader::HitbtcTrader;

/// Venue identifier
pub const EXCHANGER_NAME: &str = "hitbtc";
