//! Poloniex Trader adapter

use crate::address_cache::AddressCache;
use crate::config::{SettlementConfig, VenueConfig};
use crate::errors::{ExchangeError, Result, ResultExt, TransferLeg};
use crate::poloniex::PoloniexClient;
use crate::settlement::BalanceSettlementMonitor;
use crate::traits::{ExchangeClient, Trader};
use crate::types::*;

use async_trait::async_trait;
use bitbot_core::{Fixed, log_trade};
use tracing::info;

pub struct PoloniexTrader<C: ExchangeClient = PoloniexClient> {
    client: C,
    monitor: BalanceSettlementMonitor,
    addresses: AddressCache,
}

impl PoloniexTrader<PoloniexClient> {
    pub fn from_config(config: VenueConfig, settlement: SettlementConfig) -> Result<Self> {
        Ok(Self::new(PoloniexClient::new(config)?, settlement))
    }
}

impl<C: ExchangeClient> PoloniexTrader<C> {
    pub fn new(client: C, settlement: SettlementConfig) -> Self {
        let monitor = BalanceSettlementMonitor::new(client.name(), settlement);
        Self {
            client,
            monitor,
            addresses: AddressCache::new(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

#[async_trait(?Send)]
impl<C: ExchangeClient> Trader for PoloniexTrader<C> {
    fn exchanger(&self) -> &str {
        self.client.name()
    }

    /// `returnBalances` names every supported currency, zero or not
    async fn trading_balances(&self, currencies: &[Currency]) -> Result<BalanceMap> {
        self.client
            .trading_balances()
            .await
            .and_then(|listed| select_balances(&listed, currencies))
            .in_operation(self.exchanger(), "trading_balances")
    }

    async fn place_order(&self, side: OrderSide, pair: &Pair, price: Fixed, volume: Fixed) -> Result<OrderConfirmation> {
        let venue = self.exchanger();
        let request = OrderRequest::new(side, pair.clone(), price, volume, OrderType::Limit)
            .in_operation(venue, "place_order")?;

        let confirmation = self
            .client
            .place_order(&request)
            .await
            .in_operation(venue, "place_order")?;
        log_trade!(venue, side, pair, volume, price);
        Ok(confirmation)
    }

    async fn withdraw(&self, volume: Fixed, currency: &Currency, destination: &str) -> Result<String> {
        let venue = self.exchanger();
        let reply = self
            .client
            .withdraw(volume, currency, destination)
            .await
            .map_err(|e| ExchangeError::transfer(venue, TransferLeg::Withdrawal, currency, e))
            .in_operation(venue, "withdraw")?;
        info!("{venue}: {reply}");
        Ok(reply)
    }

    /// Deposits are credited straight to the trading balance
    async fn wait_balance(&self, currency: &Currency) -> Result<()> {
        let client = &self.client;
        self.monitor
            .wait(currency, move || async move {
                let balances = client.trading_balances().await?;
                Ok(balances.get(currency).copied().unwrap_or(Fixed::ZERO))
            })
            .await
            .in_operation(self.exchanger(), "wait_balance")?;
        Ok(())
    }

    async fn payment_address(&self, currency: &Currency) -> Result<String> {
        self.addresses
            .get_or_load_all(currency, || self.client.deposit_addresses())
            .await
            .in_operation(self.exchanger(), "payment_address")
    }
}
