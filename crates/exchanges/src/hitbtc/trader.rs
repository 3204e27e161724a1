//! HitBTC Trader adapter

use crate::address_cache::AddressCache;
use crate::config::{SettlementConfig, VenueConfig};
use crate::errors::{ExchangeError, Result, ResultExt, TransferLeg};
use crate::hitbtc::HitbtcClient;
use crate::settlement::BalanceSettlementMonitor;
use crate::traits::{ExchangeClient, Trader};
use crate::types::*;

use async_trait::async_trait;
use bitbot_core::{Fixed, log_trade};
use tracing::info;

pub struct HitbtcTrader<C: ExchangeClient = HitbtcClient> {
    client: C,
    monitor: BalanceSettlementMonitor,
    addresses: AddressCache,
}

impl HitbtcTrader<HitbtcClient> {
    pub fn from_config(config: VenueConfig, settlement: SettlementConfig) -> Result<Self> {
        Ok(Self::new(HitbtcClient::new(config)?, settlement))
    }
}

impl<C: ExchangeClient> HitbtcTrader<C> {
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
impl<C: ExchangeClient> Trader for HitbtcTrader<C> {
    fn exchanger(&self) -> &str {
        self.client.name()
    }

    /// The trading balance listing names every supported currency, zero or not
    async fn trading_balances(&self, currencies: &[Currency]) -> Result<BalanceMap> {
        self.client
            .trading_balances()
            .await
            .and_then(|listed| select_balances(&listed, currencies))
            .in_operation(self.exchanger(), "trading_balances")
    }

    async fn place_order(&self, side: OrderSide, pair: &Pair, price: Fixed, volume: Fixed) -> Result<OrderConfirmation> {
        let venue = self.exchanger();
        let request = OrderRequest::new(side, pair.clone(), price, volume, OrderType::Market)
            .in_operation(venue, "place_order")?;

        let confirmation = self
            .client
            .place_order(&request)
            .await
            .in_operation(venue, "place_order")?;
        log_trade!(venue, side, pair, volume, price);
        Ok(confirmation)
    }

    /// Funds must reach the bank account before they can leave the venue
    async fn withdraw(&self, volume: Fixed, currency: &Currency, destination: &str) -> Result<String> {
        let venue = self.exchanger();

        let transfer_id = self
            .client
            .transfer_to_main(volume, currency)
            .await
            .map_err(|e| ExchangeError::transfer(venue, TransferLeg::TradingToMain, currency, e))
            .in_operation(venue, "withdraw")?;
        info!("{venue}: moved {volume} {currency} from trading to main account ({transfer_id})");

        let withdrawal_id = self
            .client
            .withdraw(volume, currency, destination)
            .await
            .map_err(|e| ExchangeError::transfer(venue, TransferLeg::Withdrawal, currency, e))
            .in_operation(venue, "withdraw")?;
        info!("{venue}: withdrew {volume} {currency} to {destination} ({withdrawal_id})");
        Ok(withdrawal_id)
    }

    /// Deposits land in the bank account; once settled the whole balance is
    /// moved to the trading account
    async fn wait_balance(&self, currency: &Currency) -> Result<()> {
        let venue = self.exchanger();
        let client = &self.client;

        let settled = self
            .monitor
            .wait(currency, move || async move {
                let balances = client.main_balances().await?;
                Ok(balances.get(currency).copied().unwrap_or(Fixed::ZERO))
            })
            .await
            .in_operation(venue, "wait_balance")?;

        let transfer_id = client
            .transfer_to_trading(settled, currency)
            .await
            .map_err(|e| ExchangeError::transfer(venue, TransferLeg::MainToTrading, currency, e))
            .in_operation(venue, "wait_balance")?;
        info!("{venue}: moved {settled} {currency} from main to trading account ({transfer_id})");
        Ok(())
    }

    async fn payment_address(&self, currency: &Currency) -> Result<String> {
        self.addresses
            .get_or_load_one(currency, || self.client.deposit_address(currency))
            .await
            .in_operation(self.exchanger(), "payment_address")
    }
}
