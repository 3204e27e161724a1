//! Wall-clock timestamps and latency measurement
//!
//! Order books carry the `Timestamp` at which they were fetched so a report
//! can show how far apart two venues' snapshots were. `PerfTimer` measures
//! REST round-trips and logs them when dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Nanoseconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    pub nanos: u64,
}

impl Timestamp {
    pub fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    pub fn now() -> Self {
        Self { nanos: nanos() }
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        let secs = self.nanos / 1_000_000_000;
        let nsecs = (self.nanos % 1_000_000_000) as u32;
        DateTime::from_timestamp(secs as i64, nsecs).unwrap_or_else(Utc::now)
    }

    pub fn elapsed_micros(&self) -> u64 {
        nanos().saturating_sub(self.nanos) / 1_000
    }

    /// Absolute distance between two timestamps in milliseconds
    pub fn distance_millis(&self, other: &Timestamp) -> u64 {
        self.nanos.abs_diff(other.nanos) / 1_000_000
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        let nanos = dt.timestamp() as u64 * 1_000_000_000 + dt.timestamp_subsec_nanos() as u64;
        Self { nanos }
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_datetime().format("%Y-%m-%d %H:%M:%S%.3f UTC"))
    }
}

/// Current system time in nanoseconds since the Unix epoch
#[inline]
pub fn nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

/// Scoped latency timer, logs at debug level on drop
pub struct PerfTimer {
    start: Timestamp,
    name: String,
}

impl PerfTimer {
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Timestamp::now(),
            name: name.into(),
        }
    }

    pub fn elapsed_micros(&self) -> u64 {
        self.start.elapsed_micros()
    }
}

impl Drop for PerfTimer {
    fn drop(&mut self) {
        let micros = self.elapsed_micros();
        if micros < 1000 {
            tracing::debug!("⏱️  {} took {}μs", self.name, micros);
        } else {
            tracing::debug!("⏱️  {} took {:.3}ms", self.name, micros as f64 / 1000.0);
        }
    }
}
