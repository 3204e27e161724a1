//! Standard currency codes to Kraken asset codes

use crate::errors::{ExchangeError, Result};
use crate::types::{Currency, Pair};

/// Kraken's names for one currency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KrakenAsset {
    /// Standard code (`BTC`)
    pub standard: &'static str,
    /// Asset code used by balances and funding calls (`XXBT`)
    pub asset: &'static str,
    /// Short code used in pair names (`XBT`)
    pub pair_code: &'static str,
}

const fn asset(standard: &'static str, asset: &'static str, pair_code: &'static str) -> KrakenAsset {
    KrakenAsset {
        standard,
        asset,
        pair_code,
    }
}

pub const ASSETS: &[KrakenAsset] = &[
    asset("BTC", "XXBT", "XBT"),
    asset("ETH", "XETH", "ETH"),
    asset("LTC", "XLTC", "LTC"),
    asset("XRP", "XXRP", "XRP"),
    asset("XMR", "XXMR", "XMR"),
    asset("ZEC", "XZEC", "ZEC"),
    asset("ETC", "XETC", "ETC"),
    asset("DASH", "DASH", "DASH"),
    asset("USDT", "USDT", "USDT"),
    asset("USD", "ZUSD", "USD"),
    asset("EUR", "ZEUR", "EUR"),
    asset("GBP", "ZGBP", "GBP"),
    asset("CAD", "ZCAD", "CAD"),
    asset("JPY", "ZJPY", "JPY"),
];

pub fn lookup(currency: &Currency) -> Result<&'static KrakenAsset> {
    ASSETS
        .iter()
        .find(|a| a.standard == currency.as_str())
        .ok_or_else(|| ExchangeError::UnsupportedCurrency(currency.clone()))
}

/// Reverse lookup from an asset code as found in a balance reply
pub fn from_asset_code(code: &str) -> Option<Currency> {
    ASSETS
        .iter()
        .find(|a| a.asset == code)
        .map(|a| Currency::from(a.standard))
}

/// `BTC_USD` -> `XBTUSD`
pub fn pair_name(pair: &Pair) -> Result<String> {
    Ok(format!("{}{}", lookup(&pair.base)?.pair_code, lookup(&pair.quote)?.pair_code))
}
