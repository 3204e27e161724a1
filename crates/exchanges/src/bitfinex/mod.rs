//! Bitfinex integration, public order books only

pub mod rest;

pub use rest::BitfinexClient;

/// Venue identifier
pub const EXCHANGER_NAME: &str = "bitfinex";
