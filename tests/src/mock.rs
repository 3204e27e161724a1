//! Scripted in-memory `ExchangeClient`

use async_trait::async_trait;
use bitbot_core::Fixed;
use bitbot_exchanges::prelude::*;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

/// Replies handed out in order; the last one repeats forever
struct Script<T> {
    replies: RefCell<VecDeque<T>>,
}

impl<T: Clone> Script<T> {
    fn new() -> Self {
        Self {
            replies: RefCell::new(VecDeque::new()),
        }
    }

    fn push(&self, reply: T) {
        self.replies.borrow_mut().push_back(reply);
    }

    fn next(&self) -> Option<T> {
        let mut replies = self.replies.borrow_mut();
        if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        }
    }
}

pub fn level(price: &str, volume: &str) -> PriceLevel {
    PriceLevel::new(
        Fixed::from_str_exact(price).unwrap(),
        Fixed::from_str_exact(volume).unwrap(),
    )
    .unwrap()
}

/// Book with at most one level per side, as `(price, volume)`
pub fn book(venue: &str, bid: Option<(&str, &str)>, ask: Option<(&str, &str)>) -> OrderBook {
    let side = |quote: Option<(&str, &str)>| quote.map(|(p, v)| vec![level(p, v)]).unwrap_or_default();
    OrderBook::new(venue, Pair::new("BTC", "USD"), side(bid), side(ask))
}

pub struct MockExchangeClient {
    name: String,
    order_book: Option<OrderBook>,
    delay: Duration,
    trading_balances: Script<Result<BalanceMap>>,
    main_balances: Script<Result<BalanceMap>>,
    queries: HashMap<String, Script<Result<Value>>>,
    deposit_addresses: HashMap<Currency, String>,
    failures: HashMap<&'static str, ExchangeError>,
    calls: RefCell<Vec<(String, String)>>,
    orders: RefCell<Vec<OrderRequest>>,
}

impl MockExchangeClient {
    /// A venue without any scripted data; its order book fetch fails
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            order_book: None,
            delay: Duration::ZERO,
            trading_balances: Script::new(),
            main_balances: Script::new(),
            queries: HashMap::new(),
            deposit_addresses: HashMap::new(),
            failures: HashMap::new(),
            calls: RefCell::new(Vec::new()),
            orders: RefCell::new(Vec::new()),
        }
    }

    pub fn with_quotes(mut self, bid: Option<(&str, &str)>, ask: Option<(&str, &str)>) -> Self {
        self.order_book = Some(book(&self.name, bid, ask));
        self
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay = Duration::from_millis(delay_ms);
        self
    }

    /// Successive trading balance readings of one currency
    pub fn with_trading_balances(self, currency: &str, amounts: &[&str]) -> Self {
        for amount in amounts {
            self.trading_balances.push(Ok(balance_map(currency, amount)));
        }
        self
    }

    /// One trading balance listing covering several currencies
    pub fn with_trading_listing(self, listing: &[(&str, &str)]) -> Self {
        let balances = listing
            .iter()
            .map(|(currency, amount)| (Currency::from(*currency), Fixed::from_str_exact(amount).unwrap()))
            .collect();
        self.trading_balances.push(Ok(balances));
        self
    }

    pub fn with_trading_balance_error(self, error: ExchangeError) -> Self {
        self.trading_balances.push(Err(error));
        self
    }

    /// Successive main account readings of one currency
    pub fn with_main_balances(self, currency: &str, amounts: &[&str]) -> Self {
        for amount in amounts {
            self.main_balances.push(Ok(balance_map(currency, amount)));
        }
        self
    }

    /// Queue a reply for the RPC `method`
    pub fn with_query(mut self, method: &str, reply: Result<Value>) -> Self {
        self.queries
            .entry(method.to_string())
            .or_insert_with(Script::new)
            .push(reply);
        self
    }

    pub fn with_deposit_addresses(mut self, addresses: &[(&str, &str)]) -> Self {
        self.deposit_addresses = addresses
            .iter()
            .map(|(currency, address)| (Currency::from(*currency), address.to_string()))
            .collect();
        self
    }

    /// Make every call of `operation` fail with `error`
    pub fn failing(mut self, operation: &'static str, error: ExchangeError) -> Self {
        self.failures.insert(operation, error);
        self
    }

    /// Recorded `(operation, arguments)` in call order
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.borrow().clone()
    }

    pub fn operations(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(op, _)| op.clone()).collect()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls.borrow().iter().filter(|(op, _)| op == operation).count()
    }

    pub fn orders(&self) -> Vec<OrderRequest> {
        self.orders.borrow().clone()
    }

    fn record(&self, operation: &str, args: String) -> Result<()> {
        self.calls.borrow_mut().push((operation.to_string(), args));
        match self.failures.get(operation) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn unscripted(&self, operation: &str) -> ExchangeError {
        ExchangeError::FeatureNotSupported(format!("{}: nothing scripted for {operation}", self.name))
    }
}

fn balance_map(currency: &str, amount: &str) -> BalanceMap {
    BalanceMap::from([(Currency::from(currency), Fixed::from_str_exact(amount).unwrap())])
}

#[async_trait(?Send)]
impl ExchangeClient for MockExchangeClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn order_book(&self, pair: &Pair) -> Result<OrderBook> {
        self.record("order_book", pair.to_string())?;
        if !self.delay.is_zero() {
            monoio::time::sleep(self.delay).await;
        }
        self.order_book
            .clone()
            .ok_or_else(|| ExchangeError::NetworkError(format!("{} unreachable", self.name)))
    }

    async fn trading_balances(&self) -> Result<BalanceMap> {
        self.record("trading_balances", String::new())?;
        self.trading_balances
            .next()
            .unwrap_or_else(|| Err(self.unscripted("trading_balances")))
    }

    async fn main_balances(&self) -> Result<BalanceMap> {
        self.record("main_balances", String::new())?;
        self.main_balances
            .next()
            .unwrap_or_else(|| Err(self.unscripted("main_balances")))
    }

    async fn place_order(&self, request: &OrderRequest) -> Result<OrderConfirmation> {
        self.record("place_order", format!("{} {} {}@{}", request.side, request.pair, request.volume, request.price))?;
        self.orders.borrow_mut().push(request.clone());
        Ok(OrderConfirmation {
            venue: self.name.clone(),
            order_id: format!("mock-{}", self.orders.borrow().len()),
            raw: Value::Null,
        })
    }

    async fn withdraw(&self, volume: Fixed, currency: &Currency, destination: &str) -> Result<String> {
        self.record("withdraw", format!("{volume} {currency} {destination}"))?;
        Ok(format!("withdrawal-{currency}"))
    }

    async fn transfer_to_main(&self, volume: Fixed, currency: &Currency) -> Result<String> {
        self.record("transfer_to_main", format!("{volume} {currency}"))?;
        Ok("transfer-to-main".to_string())
    }

    async fn transfer_to_trading(&self, volume: Fixed, currency: &Currency) -> Result<String> {
        self.record("transfer_to_trading", format!("{volume} {currency}"))?;
        Ok("transfer-to-trading".to_string())
    }

    async fn deposit_addresses(&self) -> Result<HashMap<Currency, String>> {
        self.record("deposit_addresses", String::new())?;
        Ok(self.deposit_addresses.clone())
    }

    async fn deposit_address(&self, currency: &Currency) -> Result<String> {
        self.record("deposit_address", currency.to_string())?;
        self.deposit_addresses
            .get(currency)
            .cloned()
            .ok_or_else(|| ExchangeError::MissingAddress(currency.clone()))
    }

    async fn query(&self, method: &str, params: &[(&str, &str)]) -> Result<Value> {
        let args = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        self.record(&format!("query:{method}"), args)?;
        self.queries
            .get(method)
            .and_then(Script::next)
            .unwrap_or_else(|| Err(self.unscripted(method)))
    }
}
