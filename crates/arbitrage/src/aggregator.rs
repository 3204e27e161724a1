//! Concurrent order book aggregation
//!
//! One monoio task per venue; results come back over a flume channel tagged
//! with the venue's position so the output lines up with the input no
//! matter which venue answers first.

use bitbot_core::PerfTimer;
use bitbot_exchanges::{ExchangeClient, OrderBook, Pair};
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct AggregatorConfig {
    /// Stop waiting for slow venues after this long; `None` waits for all
    pub deadline: Option<Duration>,
}

impl AggregatorConfig {
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderBookAggregator {
    config: AggregatorConfig,
}

impl OrderBookAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Fetch `pair` from every client concurrently.
    ///
    /// Slot `i` of the result holds the book of `clients[i]`, or `None` when
    /// that fetch failed or missed the deadline.
    pub async fn fetch_all(&self, clients: &[Rc<dyn ExchangeClient>], pair: &Pair) -> Vec<Option<OrderBook>> {
        let _timer = PerfTimer::start(format!("fetch_all {pair}"));
        let (tx, rx) = flume::unbounded();

        for (index, client) in clients.iter().enumerate() {
            let client = Rc::clone(client);
            let pair = pair.clone();
            let tx = tx.clone();
            monoio::spawn(async move {
                let result = client.order_book(&pair).await;
                // The round may already be over when the deadline passed.
                let _ = tx.send((index, result));
            });
        }
        drop(tx);

        let mut slots: Vec<Option<OrderBook>> = vec![None; clients.len()];
        let mut reported = vec![false; clients.len()];

        let collect = async {
            while let Ok((index, result)) = rx.recv_async().await {
                reported[index] = true;
                match result {
                    Ok(book) => slots[index] = Some(book),
                    Err(e) => warn!("{}: order book fetch failed: {}", clients[index].name(), e),
                }
            }
        };

        match self.config.deadline {
            Some(deadline) => {
                if monoio::time::timeout(deadline, collect).await.is_err() {
                    for (client, _) in clients.iter().zip(&reported).filter(|(_, done)| !**done) {
                        warn!("{}: order book fetch timed out after {:?}", client.name(), deadline);
                    }
                }
            }
            None => collect.await,
        }

        debug!(
            "{}: {}/{} order books fetched",
            pair,
            slots.iter().filter(|slot| slot.is_some()).count(),
            clients.len()
        );
        slots
    }
}
