//! Venue and settlement configuration

use crate::auth::Credentials;
use crate::errors::Result;
use crate::types::Currency;
use bitbot_core::Fixed;
use std::collections::HashMap;
use std::time::Duration;

/// Connection settings for one venue
#[derive(Debug, Clone)]
pub struct VenueConfig {
    pub credentials: Credentials,
    pub base_url: String,
    pub timeout_ms: u64,
}

impl VenueConfig {
    fn with_base(base_url: &str) -> Self {
        Self {
            credentials: Credentials::default(),
            base_url: base_url.to_string(),
            timeout_ms: 10_000,
        }
    }

    pub fn hitbtc() -> Self {
        Self::with_base("https://api.hitbtc.com")
    }

    pub fn poloniex() -> Self {
        Self::with_base("https://poloniex.com")
    }

    pub fn kraken() -> Self {
        Self::with_base("https://api.kraken.com")
    }

    pub fn bitfinex() -> Self {
        Self::with_base("https://api-pub.bitfinex.com")
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Read credentials from `<PREFIX>_API_KEY` / `<PREFIX>_API_SECRET`
    pub fn with_env_credentials(mut self, prefix: &str) -> Result<Self> {
        self.credentials = Credentials::from_env(prefix)?;
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Balance settlement polling policy
#[derive(Debug, Clone)]
pub struct SettlementConfig {
    /// Sleep between two balance polls
    pub poll_interval: Duration,
    /// Give up after this long; `None` waits forever
    pub max_wait: Option<Duration>,
    /// Balance at which a currency counts as settled
    pub thresholds: HashMap<Currency, Fixed>,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2 * 60),
            max_wait: Some(Duration::from_secs(6 * 60 * 60)),
            thresholds: HashMap::new(),
        }
    }
}

impl SettlementConfig {
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_max_wait(mut self, max_wait: Option<Duration>) -> Self {
        self.max_wait = max_wait;
        self
    }

    pub fn with_threshold(mut self, currency: impl Into<Currency>, threshold: Fixed) -> Self {
        self.thresholds.insert(currency.into(), threshold);
        self
    }

    pub fn threshold(&self, currency: &Currency) -> Option<Fixed> {
        self.thresholds.get(currency).copied()
    }
}
