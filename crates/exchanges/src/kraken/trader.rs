//! Kraken Trader adapter

use crate::address_cache::AddressCache;
use crate::config::{SettlementConfig, VenueConfig};
use crate::errors::{ExchangeError, Result, ResultExt, TransferLeg};
use crate::kraken::rest::parse_balances;
use crate::kraken::{KrakenClient, currencies};
use crate::settlement::BalanceSettlementMonitor;
use crate::traits::{ExchangeClient, Trader};
use crate::types::*;

use async_trait::async_trait;
use bitbot_core::{Fixed, log_trade};
use tracing::info;

pub struct KrakenTrader<C: ExchangeClient = KrakenClient> {
    client: C,
    monitor: BalanceSettlementMonitor,
    addresses: AddressCache,
}

impl KrakenTrader<KrakenClient> {
    pub fn from_config(config: VenueConfig, settlement: SettlementConfig) -> Result<Self> {
        Ok(Self::new(KrakenClient::new(config)?, settlement))
    }
}

impl<C: ExchangeClient> KrakenTrader<C> {
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

    /// Balance of one currency; Kraken omits assets it holds none of
    async fn balance(&self, currency: &Currency) -> Result<Fixed> {
        currencies::lookup(currency)?;
        let balances = parse_balances(&self.client.query("Balance", &[]).await?)?;
        Ok(balances.get(currency).copied().unwrap_or(Fixed::ZERO))
    }

    /// Deposit methods first, then the first address of the first method
    async fn resolve_address(&self, currency: &Currency) -> Result<String> {
        let asset = currencies::lookup(currency)?.asset;

        let methods = self.client.query("DepositMethods", &[("asset", asset)]).await?;
        let method = methods[0]["method"]
            .as_str()
            .ok_or_else(|| ExchangeError::InvalidResponse(format!("Kraken: no deposit method for {currency}")))?;

        let addresses = self
            .client
            .query("DepositAddresses", &[("asset", asset), ("method", method)])
            .await?;
        addresses[0]["address"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ExchangeError::MissingAddress(currency.clone()))
    }
}

#[async_trait(?Send)]
impl<C: ExchangeClient> Trader for KrakenTrader<C> {
    fn exchanger(&self) -> &str {
        self.client.name()
    }

    /// Exactly the requested currencies, zero where Kraken reports nothing
    async fn trading_balances(&self, requested: &[Currency]) -> Result<BalanceMap> {
        let venue = self.exchanger();
        for currency in requested {
            currencies::lookup(currency).in_operation(venue, "trading_balances")?;
        }

        let all = self
            .client
            .query("Balance", &[])
            .await
            .and_then(|result| parse_balances(&result))
            .in_operation(venue, "trading_balances")?;

        Ok(requested
            .iter()
            .map(|c| (c.clone(), all.get(c).copied().unwrap_or(Fixed::ZERO)))
            .collect())
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

    /// `destination` is the name of a withdrawal key set up on Kraken
    async fn withdraw(&self, volume: Fixed, currency: &Currency, destination: &str) -> Result<String> {
        let venue = self.exchanger();
        let asset = currencies::lookup(currency).in_operation(venue, "withdraw")?.asset;
        let amount = volume.to_string();

        let result = self
            .client
            .query("Withdraw", &[("asset", asset), ("key", destination), ("amount", amount.as_str())])
            .await
            .and_then(|result| {
                result["refid"]
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ExchangeError::InvalidResponse(format!("Kraken Withdraw without refid: {result}")))
            })
            .map_err(|e| ExchangeError::transfer(venue, TransferLeg::Withdrawal, currency, e))
            .in_operation(venue, "withdraw")?;
        info!("{venue}: withdrew {volume} {currency} to key {destination} ({result})");
        Ok(result)
    }

    async fn wait_balance(&self, currency: &Currency) -> Result<()> {
        self.monitor
            .wait(currency, || self.balance(currency))
            .await
            .in_operation(self.exchanger(), "wait_balance")?;
        Ok(())
    }

    async fn payment_address(&self, currency: &Currency) -> Result<String> {
        self.addresses
            .get_or_load_one(currency, || self.resolve_address(currency))
            .await
            .in_operation(self.exchanger(), "payment_address")
    }
}
