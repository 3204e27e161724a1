//! Client order ids and request nonces
//!
//! Signed venue APIs reject any nonce that is not strictly greater than the
//! previous one for the same key, so each authenticated client owns a
//! `NonceGenerator` seeded from the wall clock.

use nanoid::nanoid;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::timing::nanos;

const ORDER_ID_ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Client-side order id: `bb` prefix plus 20 lowercase alphanumerics
pub fn client_order_id() -> String {
    format!("bb{}", nanoid!(20, &ORDER_ID_ALPHABET))
}

/// Strictly increasing nonce source
#[derive(Debug)]
pub struct NonceGenerator {
    last: AtomicU64,
}

impl NonceGenerator {
    pub fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    /// Microseconds since the epoch, bumped past the previous value if the
    /// clock has not advanced.
    pub fn next(&self) -> u64 {
        let now = nanos() / 1_000;
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, candidate, Ordering::SeqCst, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }
}

impl Default for NonceGenerator {
    fn default() -> Self {
        Self::new()
    }
}
