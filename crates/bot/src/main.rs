//! bitbot driver
//!
//! Runs `BITBOT_ROUNDS` aggregation rounds over every venue, logs the
//! arbitrage opportunities found and appends one report row per round.

mod config;

use anyhow::{Context, Result};
use bitbot_arbitrage::{
    AggregatorConfig, ArbitrageDetector, CsvReportSink, OpportunityFilter, OrderBookAggregator, ReportRow,
};
use bitbot_core::{BotRuntime, Fixed, init_logging, log_error};
use bitbot_exchanges::{
    BitfinexClient, ExchangeClient, HitbtcClient, HitbtcTrader, KrakenClient, KrakenTrader, PoloniexClient,
    PoloniexTrader, SettlementConfig, Trader, VenueConfig,
};
use config::BotConfig;
use std::fs::{self, File};
use std::rc::Rc;
use tracing::{debug, info};

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let config = BotConfig::from_env()?;
    info!("🚀 Starting bitbot on {}", config.pair);

    BotRuntime::new().start(|| run(config))?
}

/// Venue config with `<PREFIX>_API_KEY`/`_API_SECRET` when both are set
fn venue(base: VenueConfig, prefix: &str) -> VenueConfig {
    match base.clone().with_env_credentials(prefix) {
        Ok(config) => config,
        Err(e) => {
            debug!("{prefix}: public access only ({e})");
            base
        }
    }
}

/// Public order book sources, in report column order
fn order_book_sources() -> Result<Vec<Rc<dyn ExchangeClient>>> {
    let sources: Vec<Rc<dyn ExchangeClient>> = vec![
        Rc::new(HitbtcClient::new(VenueConfig::hitbtc())?),
        Rc::new(BitfinexClient::new(VenueConfig::bitfinex())?),
        Rc::new(PoloniexClient::new(VenueConfig::poloniex())?),
        Rc::new(KrakenClient::new(VenueConfig::kraken())?),
    ];
    Ok(sources)
}

/// Traders for every venue with credentials in the environment
fn traders() -> Result<Vec<Box<dyn Trader>>> {
    let mut traders: Vec<Box<dyn Trader>> = Vec::new();

    let hitbtc = venue(VenueConfig::hitbtc(), "HITBTC");
    if hitbtc.credentials.is_valid() {
        traders.push(Box::new(HitbtcTrader::from_config(hitbtc, SettlementConfig::default())?));
    }
    let poloniex = venue(VenueConfig::poloniex(), "POLONIEX");
    if poloniex.credentials.is_valid() {
        traders.push(Box::new(PoloniexTrader::from_config(poloniex, SettlementConfig::default())?));
    }
    let kraken = venue(VenueConfig::kraken(), "KRAKEN");
    if kraken.credentials.is_valid() {
        traders.push(Box::new(KrakenTrader::from_config(kraken, SettlementConfig::default())?));
    }

    Ok(traders)
}

async fn run(config: BotConfig) -> Result<()> {
    let currencies = [config.pair.base.clone(), config.pair.quote.clone()];
    for trader in traders()? {
        match trader.trading_balances(&currencies).await {
            Ok(balances) => {
                for currency in &currencies {
                    let balance = balances.get(currency).copied().unwrap_or(Fixed::ZERO);
                    info!("💼 {}: {} {}", trader.exchanger(), balance, currency);
                }
            }
            Err(e) => log_error!("trading_balances", e),
        }
    }

    let sources = order_book_sources()?;
    let venues: Vec<&str> = sources.iter().map(|s| s.name()).collect();

    if let Some(parent) = config.report_path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let file = File::create(&config.report_path)
        .with_context(|| format!("creating {}", config.report_path.display()))?;
    let mut sink = CsvReportSink::new(file, &venues)?;

    let aggregator = OrderBookAggregator::new(AggregatorConfig::default().with_deadline(config.fetch_deadline));
    let detector = ArbitrageDetector::new();
    let filter = OpportunityFilter {
        min_profit_percent: config.min_profit,
        limit: None,
    };

    for round in 1..=config.rounds {
        let books = aggregator.fetch_all(&sources, &config.pair).await;

        for report in filter.apply(detector.scan(&books)) {
            info!("📈 {}", report);
        }
        sink.write_row(&ReportRow::from_books(&books))?;
        debug!("round {}/{} written to {}", round, config.rounds, config.report_path.display());

        if round < config.rounds {
            monoio::time::sleep(config.round_interval).await;
        }
    }

    info!("⏹️  Stopping bitbot");
    Ok(())
}
