//! Cross-venue arbitrage detection
//!
//! Every pair of present books is compared once. An opportunity exists when
//! one venue's best ask is strictly below the other venue's best bid.

use bitbot_core::Fixed;
use bitbot_exchanges::OrderBook;
use serde::Serialize;
use std::fmt;

/// A buy-low/sell-high pair of top-of-book levels on two venues
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpportunityReport {
    /// `100 * (sell_price / buy_price - 1)`
    pub profit_percent: Fixed,
    /// Smaller of the two top-of-book volumes
    pub tradable_volume: Fixed,
    /// `tradable_volume * (sell_price - buy_price)`, in quote currency
    pub expected_profit: Fixed,
    pub buy_venue: String,
    pub buy_price: Fixed,
    pub buy_volume: Fixed,
    pub sell_venue: String,
    pub sell_price: Fixed,
    pub sell_volume: Fixed,
}

impl fmt::Display for OpportunityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}% {} | buy {} {}/{} | sell {} {}/{} | expected {}",
            self.profit_percent.to_string_with_scale(2),
            self.tradable_volume,
            self.buy_venue,
            self.buy_price,
            self.buy_volume,
            self.sell_venue,
            self.sell_price,
            self.sell_volume,
            self.expected_profit.to_string_with_scale(2),
        )
    }
}

/// Compare the best ask of `buy` with the best bid of `sell`
fn opportunity(buy: &OrderBook, sell: &OrderBook) -> Option<OpportunityReport> {
    let ask = buy.best_ask()?;
    let bid = sell.best_bid()?;
    if ask.price() >= bid.price() {
        return None;
    }

    let tradable_volume = ask.volume().min(bid.volume());
    Some(OpportunityReport {
        profit_percent: bid.price().percent_above(ask.price()).ok()?,
        tradable_volume,
        expected_profit: tradable_volume * (bid.price() - ask.price()),
        buy_venue: buy.exchanger().to_string(),
        buy_price: ask.price(),
        buy_volume: ask.volume(),
        sell_venue: sell.exchanger().to_string(),
        sell_price: bid.price(),
        sell_volume: bid.volume(),
    })
}

/// Report for one pair of venues, whichever direction is profitable
pub fn detect_opportunity(a: &OrderBook, b: &OrderBook) -> Option<OpportunityReport> {
    opportunity(a, b).or_else(|| opportunity(b, a))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ArbitrageDetector;

impl ArbitrageDetector {
    pub fn new() -> Self {
        Self
    }

    /// All opportunities over every `i < j` pair of present books, in scan order
    pub fn scan(&self, books: &[Option<OrderBook>]) -> Vec<OpportunityReport> {
        let present: Vec<&OrderBook> = books.iter().flatten().collect();
        let mut reports = Vec::new();

        for (i, a) in present.iter().enumerate() {
            for b in &present[i + 1..] {
                if let Some(report) = detect_opportunity(a, b) {
                    reports.push(report);
                }
            }
        }
        reports
    }
}

/// Operator-side view of a scan result
#[derive(Debug, Clone, Default)]
pub struct OpportunityFilter {
    pub min_profit_percent: Option<Fixed>,
    pub limit: Option<usize>,
}

impl OpportunityFilter {
    /// Keep reports at or above the threshold, most profitable first
    pub fn apply(&self, mut reports: Vec<OpportunityReport>) -> Vec<OpportunityReport> {
        if let Some(min) = self.min_profit_percent {
            reports.retain(|r| r.profit_percent >= min);
        }
        reports.sort_by(|a, b| b.profit_percent.cmp(&a.profit_percent));
        if let Some(limit) = self.limit {
            reports.truncate(limit);
        }
        reports
    }
}
