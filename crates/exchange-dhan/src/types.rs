//! Wire types for the Dhan v2 trading API and the instrument master.
//!
//! Order payload fields use camelCase on the wire (`dhanClientId`,
//! `transactionType`, ...).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use straddle_core::{OptionType, Strike, TransactionSide};

/// Exchange segment for NSE futures & options.
pub const SEGMENT_NSE_FNO: &str = "NSE_FNO";

/// Intraday product type.
pub const PRODUCT_INTRADAY: &str = "INTRADAY";

/// Market order type.
pub const ORDER_TYPE_MARKET: &str = "MARKET";

/// Single-day validity.
pub const VALIDITY_DAY: &str = "DAY";

// =============================================================================
// Orders
// =============================================================================

/// Order payload for `POST /v2/orders`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// Client id from the authenticated session.
    pub dhan_client_id: String,
    /// BUY or SELL.
    pub transaction_type: TransactionSide,
    /// Always `NSE_FNO` for index options.
    pub exchange_segment: String,
    /// Always `INTRADAY`.
    pub product_type: String,
    /// Always `MARKET`.
    pub order_type: String,
    /// Always `DAY`.
    pub validity: String,
    /// Resolved instrument identifier.
    pub security_id: String,
    /// Contracts; one NIFTY lot per order.
    pub quantity: u32,
}

impl OrderRequest {
    /// Builds a market, intraday, day-validity order.
    #[must_use]
    pub fn market(
        client_id: impl Into<String>,
        side: TransactionSide,
        security_id: impl Into<String>,
        quantity: u32,
    ) -> Self {
        Self {
            dhan_client_id: client_id.into(),
            transaction_type: side,
            exchange_segment: SEGMENT_NSE_FNO.to_string(),
            product_type: PRODUCT_INTRADAY.to_string(),
            order_type: ORDER_TYPE_MARKET.to_string(),
            validity: VALIDITY_DAY.to_string(),
            security_id: security_id.into(),
            quantity,
        }
    }
}

/// Successful response from `POST /v2/orders`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    /// Brokerage-assigned order id.
    pub order_id: String,
    /// Status as reported at submission (e.g. `TRANSIT`, `PENDING`).
    #[serde(default)]
    pub order_status: Option<String>,
}

/// Error body Dhan returns on rejected requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

// =============================================================================
// Positions
// =============================================================================

/// One row from `GET /v2/positions`.
///
/// Only the fields the assistant needs; the endpoint returns many more.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetPosition {
    /// Display symbol, e.g. `"NIFTY-Aug2026-24800-CE"`.
    pub trading_symbol: String,
    /// Signed net quantity; negative is short.
    pub net_qty: i64,
    /// Strike price for derivative positions.
    #[serde(default)]
    pub drv_strike_price: Option<f64>,
    /// `"CALL"` or `"PUT"` for option positions.
    #[serde(default)]
    pub drv_option_type: Option<String>,
    /// Expiry date for derivative positions.
    #[serde(default)]
    pub drv_expiry_date: Option<String>,
}

// =============================================================================
// Instrument catalog
// =============================================================================

/// A row of the scrip master restricted to the fields the resolver matches
/// on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentRecord {
    /// Exchange id (`NSE`).
    pub exchange: String,
    /// Segment code (`D` for derivatives).
    pub segment: String,
    /// Instrument kind (`OPTIDX` for index options).
    pub instrument: String,
    /// Underlying symbol (`NIFTY`).
    pub underlying: String,
    /// Contract expiry date.
    pub expiry: NaiveDate,
    /// Strike price level.
    pub strike: Strike,
    /// Call or put.
    pub option_type: OptionType,
    /// Tradable security identifier.
    pub security_id: String,
}
