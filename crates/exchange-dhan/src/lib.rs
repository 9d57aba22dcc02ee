//! Dhan brokerage integration for the straddle ladder assistant.
//!
//! This crate provides:
//! - Rate-limited REST client for the Dhan v2 trading API (orders,
//!   cancellation, positions, index LTP)
//! - Instrument catalog built from the daily scrip master CSV, with a
//!   process-wide at-most-once cache
//! - Weekly expiry calendar math
//! - A REST-backed implementation of the core's market snapshot provider
//!
//! # Authentication
//!
//! Dhan uses a bearer session token. Set:
//!
//! - `DHAN_ACCESS_TOKEN`: the session JWT
//! - `DHAN_CLIENT_ID`: the login/client id
//!
//! Both are required before any order-placing operation.
//!
//! # API Endpoints
//!
//! - `POST /v2/orders` - Submit order
//! - `DELETE /v2/orders/{order_id}` - Cancel order
//! - `GET /v2/positions` - Net positions
//! - `POST /v2/marketfeed/ltp` - Index last traded price
//! - `GET api-scrip-master.csv` - Instrument master (separate host)

pub mod auth;
pub mod catalog;
pub mod client;
pub mod error;
pub mod expiry;
pub mod snapshot;
pub mod types;

pub use auth::SessionAuth;
pub use catalog::{CatalogCache, InstrumentCatalog};
pub use client::{DhanClient, DhanClientConfig, DHAN_API_URL, SCRIP_MASTER_URL};
pub use error::{DhanError, Result};
pub use expiry::{nearest_weekly_expiry, weekday_from_index};
pub use snapshot::DhanSnapshotProvider;
pub use types::{ApiErrorBody, InstrumentRecord, NetPosition, OrderReceipt, OrderRequest};
