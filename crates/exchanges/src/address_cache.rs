//! Per-Trader deposit address cache
//!
//! Entries live as long as the owning Trader; there is no expiry.

use crate::errors::{ExchangeError, Result};
use crate::types::Currency;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;

#[derive(Debug, Default)]
pub struct AddressCache {
    addresses: RefCell<HashMap<Currency, String>>,
    bulk_loaded: Cell<bool>,
}

impl AddressCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, currency: &Currency) -> Option<String> {
        self.addresses.borrow().get(currency).cloned()
    }

    pub fn len(&self) -> usize {
        self.addresses.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.borrow().is_empty()
    }

    /// Resolve through a bulk listing, loaded on the first call only
    ///
    /// A currency missing from the listing fails with `MissingAddress`
    /// without listing again. A failed listing leaves the cache unloaded.
    pub async fn get_or_load_all<F, Fut>(&self, currency: &Currency, load: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<HashMap<Currency, String>>>,
    {
        if !self.bulk_loaded.get() {
            let listed = load().await?;
            self.addresses.borrow_mut().extend(listed);
            self.bulk_loaded.set(true);
        }

        self.get(currency)
            .ok_or_else(|| ExchangeError::MissingAddress(currency.clone()))
    }

    /// Resolve one currency at a time for venues without a bulk listing
    pub async fn get_or_load_one<F, Fut>(&self, currency: &Currency, load: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        if let Some(address) = self.get(currency) {
            return Ok(address);
        }

        let address = load().await?;
        if address.is_empty() {
            return Err(ExchangeError::MissingAddress(currency.clone()));
        }
        self.addresses.borrow_mut().insert(currency.clone(), address.clone());
        Ok(address)
    }
}
