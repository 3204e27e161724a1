//! Shared fixtures for the bitbot integration tests
//!
//! `MockExchangeClient` stands in for a venue: order books, balances and RPC
//! replies are scripted, fetches can be delayed or made to fail, and every
//! call is recorded so tests can count network round trips.

pub mod mock;

pub use mock::{MockExchangeClient, book, level};
