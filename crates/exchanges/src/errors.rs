//! Exchange error taxonomy
//!
//! Order-book fetch failures are recovered by the aggregator; everything on
//! the trading path reaches the caller decorated with the venue, the
//! operation and, for fund movements, the leg that failed.

use crate::types::Currency;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type for exchange operations
pub type Result<T> = std::result::Result<T, ExchangeError>;

/// Which leg of a fund movement failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferLeg {
    /// Internal transfer from the trading account to the main account
    TradingToMain,
    /// Internal transfer from the main account back to the trading account
    MainToTrading,
    /// External withdrawal to another venue
    Withdrawal,
}

impl fmt::Display for TransferLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferLeg::TradingToMain => write!(f, "trading to main account transfer"),
            TransferLeg::MainToTrading => write!(f, "main to trading account transfer"),
            TransferLeg::Withdrawal => write!(f, "withdrawal"),
        }
    }
}

/// Exchange operation errors
#[derive(Error, Debug, Clone)]
pub enum ExchangeError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP error {0}: {1}")]
    HttpError(u16, String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Signing error: {0}")]
    SigningError(String),

    #[error("{venue} rejected the request: {message}")]
    Rejected { venue: String, message: String },

    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(Currency),

    #[error("Missing {0} deposit address")]
    MissingAddress(Currency),

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Feature not supported: {0}")]
    FeatureNotSupported(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Fixed point error: {0}")]
    FixedPointError(String),

    #[error("{venue}: {operation} failed: {source}")]
    Operation {
        venue: String,
        operation: &'static str,
        #[source]
        source: Box<ExchangeError>,
    },

    #[error("{venue}: {currency} {leg} failed: {source}")]
    Transfer {
        venue: String,
        leg: TransferLeg,
        currency: Currency,
        #[source]
        source: Box<ExchangeError>,
    },

    #[error("{venue}: {currency} balance did not settle within {waited:?}")]
    SettlementTimeout {
        venue: String,
        currency: Currency,
        waited: Duration,
    },
}

impl ExchangeError {
    /// Decorate an error with the venue and Trader operation it came from
    pub fn operation(venue: &str, operation: &'static str, source: ExchangeError) -> Self {
        Self::Operation {
            venue: venue.to_string(),
            operation,
            source: Box::new(source),
        }
    }

    /// Decorate an error with the fund-movement leg it came from
    pub fn transfer(venue: &str, leg: TransferLeg, currency: &Currency, source: ExchangeError) -> Self {
        Self::Transfer {
            venue: venue.to_string(),
            leg,
            currency: currency.clone(),
            source: Box::new(source),
        }
    }

    /// The failed leg, looking through operation decoration
    pub fn transfer_leg(&self) -> Option<TransferLeg> {
        match self {
            Self::Transfer { leg, .. } => Some(*leg),
            Self::Operation { source, .. } => source.transfer_leg(),
            _ => None,
        }
    }

    /// The innermost error with all decoration removed
    pub fn root_cause(&self) -> &ExchangeError {
        match self {
            Self::Operation { source, .. } | Self::Transfer { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<bitbot_core::FixedError> for ExchangeError {
    fn from(err: bitbot_core::FixedError) -> Self {
        Self::FixedPointError(err.to_string())
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<url::ParseError> for ExchangeError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

/// Attach venue/operation context to a fallible result
pub trait ResultExt<T> {
    fn in_operation(self, venue: &str, operation: &'static str) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn in_operation(self, venue: &str, operation: &'static str) -> Result<T> {
        self.map_err(|e| ExchangeError::operation(venue, operation, e))
    }
}
