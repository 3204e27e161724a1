//! Poloniex integration
//!
//! Pairs are written `QUOTE_BASE` and US dollars trade as `USDT`; both
//! translations stay inside this module.

pub mod rest;
pub mod trader;

pub use rest::PoloniexClient;
pub use trader::PoloniexTrader;

/// Venue identifier
pub const EXCHANGER_NAME: &str = "poloniex";
