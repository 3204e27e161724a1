//! Balance settlement polling
//!
//! After a cross-venue withdrawal the strategy has to block until the funds
//! show up on the destination venue. `BalanceSettlementMonitor` polls a
//! balance source until it reaches the configured threshold, sleeping
//! `poll_interval` between polls and giving up after `max_wait`. The sleep
//! before the final poll is cut short so the wait ends at `max_wait`.

use crate::config::SettlementConfig;
use crate::errors::{ExchangeError, Result};
use crate::types::Currency;
use bitbot_core::Fixed;
use std::future::Future;
use std::time::Instant;
use tracing::{debug, info};

/// Polls one venue's balance until a transfer has settled
#[derive(Debug, Clone)]
pub struct BalanceSettlementMonitor {
    venue: String,
    config: SettlementConfig,
}

impl BalanceSettlementMonitor {
    pub fn new(venue: impl Into<String>, config: SettlementConfig) -> Self {
        Self {
            venue: venue.into(),
            config,
        }
    }

    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    /// Poll `balance` until it reaches the threshold configured for
    /// `currency` and return the settled amount.
    ///
    /// A failing poll aborts the wait with that error. Running past
    /// `max_wait` yields `SettlementTimeout`.
    pub async fn wait<F, Fut>(&self, currency: &Currency, mut balance: F) -> Result<Fixed>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Fixed>>,
    {
        let threshold = self.config.threshold(currency).ok_or_else(|| {
            ExchangeError::ConfigurationError(format!(
                "{}: no settlement threshold configured for {currency}",
                self.venue
            ))
        })?;

        let started = Instant::now();
        let mut polls = 0u32;

        loop {
            let current = balance().await?;
            polls += 1;
            debug!(venue = %self.venue, %currency, %current, %threshold, polls, "polled balance");

            if current >= threshold {
                info!("{}: {currency} balance settled at {current} after {polls} polls", self.venue);
                return Ok(current);
            }

            let waited = started.elapsed();
            let pause = match self.config.max_wait {
                Some(max_wait) if waited >= max_wait => {
                    return Err(ExchangeError::SettlementTimeout {
                        venue: self.venue.clone(),
                        currency: currency.clone(),
                        waited,
                    });
                }
                // Last poll lands on the deadline, not a full interval past it.
                Some(max_wait) => self.config.poll_interval.min(max_wait - waited),
                None => self.config.poll_interval,
            };

            info!("{}: waiting until {currency} transfer is complete ({current} < {threshold})", self.venue);
            monoio::time::sleep(pause).await;
        }
    }
}
