//! Driver configuration from `BITBOT_*` environment variables

use anyhow::{Context, Result};
use bitbot_core::Fixed;
use bitbot_exchanges::Pair;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct BotConfig {
    pub pair: Pair,
    pub rounds: u32,
    pub round_interval: Duration,
    pub report_path: PathBuf,
    pub fetch_deadline: Option<Duration>,
    pub min_profit: Option<Fixed>,
}

impl BotConfig {
    /// Read the process environment; call `dotenv` first to include `.env`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let pair = lookup("BITBOT_PAIR").unwrap_or_else(|| "BTC_USD".to_string());
        let pair = Pair::from_str(&pair).context("BITBOT_PAIR")?;

        Ok(Self {
            pair,
            rounds: parse(&lookup, "BITBOT_ROUNDS")?.unwrap_or(1),
            round_interval: Duration::from_secs(parse(&lookup, "BITBOT_ROUND_INTERVAL_SECS")?.unwrap_or(2)),
            report_path: lookup("BITBOT_REPORT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/orderbook.csv")),
            fetch_deadline: parse(&lookup, "BITBOT_FETCH_DEADLINE_SECS")?.map(Duration::from_secs),
            min_profit: parse(&lookup, "BITBOT_MIN_PROFIT")?,
        })
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| raw.trim().parse::<T>().with_context(|| format!("invalid {key}=`{raw}`")))
        .transpose()
}
