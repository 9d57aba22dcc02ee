//! Error types for the Dhan integration.
//!
//! Catalog failures are kept distinct from instrument-lookup misses so
//! callers can tell "catalog unavailable" from "no tradable contract for
//! this strike/expiry".

use chrono::NaiveDate;
use straddle_core::{OptionType, Strike};
use thiserror::Error;

/// Errors that can occur when interacting with Dhan.
#[derive(Debug, Error)]
pub enum DhanError {
    /// Missing or unusable session credentials.
    #[error("authentication error: {0}")]
    Authentication(String),

    /// The instrument master could not be fetched or parsed.
    #[error("instrument catalog unavailable: {0}")]
    CatalogLoad(String),

    /// No tradable contract matches the requested leg.
    #[error("no tradable contract for {underlying} {strike} {option_type} expiring {expiry}")]
    InstrumentNotFound {
        /// Underlying symbol.
        underlying: String,
        /// Requested strike.
        strike: Strike,
        /// Requested option type.
        option_type: OptionType,
        /// Requested expiry date.
        expiry: NaiveDate,
    },

    /// API request failed with a non-success status.
    #[error("API error: {status_code} - {message}")]
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Error message from the API.
        message: String,
    },

    /// The brokerage rejected the order.
    #[error("order rejected: {0}")]
    OrderRejected(String),

    /// Network/transport error.
    #[error("network error: {0}")]
    Network(String),

    /// Request timeout.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl DhanError {
    /// Creates an API error from status code and message.
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status_code,
            message: message.into(),
        }
    }

    /// Creates a catalog-load error.
    pub fn catalog_load(message: impl Into<String>) -> Self {
        Self::CatalogLoad(message.into())
    }

    /// Creates an instrument-not-found error for a specific contract.
    pub fn instrument_not_found(
        underlying: impl Into<String>,
        strike: Strike,
        option_type: OptionType,
        expiry: NaiveDate,
    ) -> Self {
        Self::InstrumentNotFound {
            underlying: underlying.into(),
            strike,
            option_type,
            expiry,
        }
    }

    /// True when the failure concerns a single leg rather than the whole
    /// session (the batch policy keeps going for these).
    #[must_use]
    pub fn is_leg_scoped(&self) -> bool {
        matches!(
            self,
            Self::InstrumentNotFound { .. }
                | Self::OrderRejected(_)
                | Self::Network(_)
                | Self::Timeout(_)
                | Self::Api { .. }
        )
    }
}

impl From<reqwest::Error> for DhanError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Network(format!("connection failed: {err}"))
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DhanError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<csv::Error> for DhanError {
    fn from(err: csv::Error) -> Self {
        Self::CatalogLoad(err.to_string())
    }
}

/// Result type alias for Dhan operations.
pub type Result<T> = std::result::Result<T, DhanError>;
