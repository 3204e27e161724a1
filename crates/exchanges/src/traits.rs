//! Exchange traits defining the two seams of the system
//!
//! `ExchangeClient` is the per-venue wire client: every venue fetches order
//! books, trading venues add account operations. Operations a venue does not
//! offer keep the default body and fail with `FeatureNotSupported`.
//!
//! `Trader` is the uniform contract a strategy drives. Venue quirks such as a
//! pre-withdrawal internal transfer or a two-step deposit address lookup live
//! inside the adapter that implements it.
//!
//! Both traits are `?Send`: monoio sockets and tasks stay on one thread.

use crate::errors::{ExchangeError, Result};
use crate::types::*;
use async_trait::async_trait;
use bitbot_core::Fixed;
use serde_json::Value;
use std::collections::HashMap;

fn unsupported<T>(venue: &str, operation: &str) -> Result<T> {
    Err(ExchangeError::FeatureNotSupported(format!("{venue} has no {operation}")))
}

/// Per-venue REST client
#[async_trait(?Send)]
pub trait ExchangeClient {
    /// Venue identifier, constant per client
    fn name(&self) -> &str;

    /// Current top of the venue's book for `pair`
    async fn order_book(&self, pair: &Pair) -> Result<OrderBook>;

    /// Balances available for order placement
    async fn trading_balances(&self) -> Result<BalanceMap> {
        unsupported(self.name(), "trading balances")
    }

    /// Balances of the main (withdrawal) account
    async fn main_balances(&self) -> Result<BalanceMap> {
        unsupported(self.name(), "main account")
    }

    async fn place_order(&self, _request: &OrderRequest) -> Result<OrderConfirmation> {
        unsupported(self.name(), "order placement")
    }

    /// Send funds to an external address, returns the venue's reference
    async fn withdraw(&self, _volume: Fixed, _currency: &Currency, _destination: &str) -> Result<String> {
        unsupported(self.name(), "withdrawal")
    }

    async fn transfer_to_main(&self, _volume: Fixed, _currency: &Currency) -> Result<String> {
        unsupported(self.name(), "account transfers")
    }

    async fn transfer_to_trading(&self, _volume: Fixed, _currency: &Currency) -> Result<String> {
        unsupported(self.name(), "account transfers")
    }

    /// Every deposit address of the account in one call
    async fn deposit_addresses(&self) -> Result<HashMap<Currency, String>> {
        unsupported(self.name(), "bulk deposit address listing")
    }

    /// Deposit address of a single currency
    async fn deposit_address(&self, _currency: &Currency) -> Result<String> {
        unsupported(self.name(), "deposit address lookup")
    }

    /// Generic authenticated RPC call for venues with method-style APIs
    async fn query(&self, method: &str, _params: &[(&str, &str)]) -> Result<Value> {
        unsupported(self.name(), &format!("RPC method {method}"))
    }
}

/// Uniform trading capability, one adapter per venue
#[async_trait(?Send)]
pub trait Trader {
    /// Venue identifier, constant per adapter
    fn exchanger(&self) -> &str;

    /// Trading balances of exactly `currencies`; a currency the venue does
    /// not support fails with `UnsupportedCurrency`
    async fn trading_balances(&self, currencies: &[Currency]) -> Result<BalanceMap>;

    /// Place an order; price and volume must be positive
    async fn place_order(&self, side: OrderSide, pair: &Pair, price: Fixed, volume: Fixed) -> Result<OrderConfirmation>;

    /// Withdraw to `destination`, returns the confirmation id
    async fn withdraw(&self, volume: Fixed, currency: &Currency, destination: &str) -> Result<String>;

    /// Block until the awaited balance of `currency` has settled
    async fn wait_balance(&self, currency: &Currency) -> Result<()>;

    /// Deposit address other venues should send `currency` to
    async fn payment_address(&self, currency: &Currency) -> Result<String>;
}
