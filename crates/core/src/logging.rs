//! Logging bootstrap
//!
//! Every crate logs through `tracing`; the binary installs one fmt
//! subscriber filtered by `RUST_LOG` (default `info`).

use std::sync::Once;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

static INIT: Once = Once::new();

/// Install the global tracing subscriber. Safe to call more than once.
pub fn init_logging() {
    INIT.call_once(|| {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .finish();

        if tracing::subscriber::set_global_default(subscriber).is_err() {
            // A test harness or embedding binary already installed one.
            return;
        }

        tracing::info!("📝 Initialized tracing logging");
    });
}

#[macro_export]
macro_rules! log_trade {
    ($venue:expr, $side:expr, $pair:expr, $volume:expr, $price:expr) => {
        tracing::info!("💰 {}: {} {} {} @ {}", $venue, $side, $pair, $volume, $price);
    };
}

#[macro_export]
macro_rules! log_error {
    ($operation:expr, $error:expr) => {
        tracing::error!("❌ {} failed: {}", $operation, $error);
    };
}
