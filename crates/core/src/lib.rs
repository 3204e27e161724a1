//! # bitbot core
//!
//! Runtime and primitive types shared by every bitbot crate.
//!
//! - **Fixed-point arithmetic** - prices, volumes and balances never touch `f64`
//! - **Single-threaded async with monoio** - one thread drives all venue I/O
//! - **Timing** - fetch timestamps and REST latency logging
//! - **Unified logging** - `tracing` with an env-filtered fmt subscriber
//! - **Ids** - client order ids and strictly increasing request nonces

pub mod fixed;
pub mod id_gen;
pub mod logging;
pub mod runtime;
pub mod timing;

pub use fixed::{Fixed, FixedError};
pub use id_gen::{NonceGenerator, client_order_id};
pub use logging::init_logging;
pub use runtime::{BotRuntime, RuntimeConfig};
pub use timing::{PerfTimer, Timestamp, nanos};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixed::{Fixed, FixedError};
    pub use crate::id_gen::{NonceGenerator, client_order_id};
    pub use crate::logging::init_logging;
    pub use crate::runtime::{BotRuntime, RuntimeConfig};
    pub use crate::timing::{PerfTimer, Timestamp, nanos};

    pub use monoio;
    pub use serde::{Deserialize, Serialize};
}
