//! Dhan REST API client with rate limiting.
//!
//! Covers the endpoints the assistant needs: order placement and
//! cancellation, net positions, the index LTP feed, and the scrip master
//! download. Requests are paced through a `governor` rate limiter; orders
//! are submitted exactly once per call and never retried here.

use crate::auth::SessionAuth;
use crate::error::{DhanError, Result};
use crate::types::{ApiErrorBody, NetPosition, OrderReceipt, OrderRequest};
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use straddle_core::DhanConfig;

/// Dhan production trading API base URL.
pub const DHAN_API_URL: &str = "https://api.dhan.co";

/// Published location of the daily scrip master CSV.
pub const SCRIP_MASTER_URL: &str = "https://images.dhan.co/api-data/api-scrip-master.csv";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the Dhan client.
#[derive(Debug, Clone)]
pub struct DhanClientConfig {
    /// Trading API base URL.
    pub base_url: String,

    /// Scrip master CSV URL.
    pub scrip_master_url: String,

    /// Requests per minute limit.
    pub requests_per_minute: NonZeroU32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for DhanClientConfig {
    fn default() -> Self {
        Self {
            base_url: DHAN_API_URL.to_string(),
            scrip_master_url: SCRIP_MASTER_URL.to_string(),
            requests_per_minute: nonzero!(60u32),
            timeout_secs: 30,
        }
    }
}

impl DhanClientConfig {
    /// Builds a client config from the application's Dhan section.
    #[must_use]
    pub fn from_app(config: &DhanConfig) -> Self {
        Self {
            base_url: config.api_url.clone(),
            scrip_master_url: config.scrip_master_url.clone(),
            requests_per_minute: NonZeroU32::new(config.requests_per_minute)
                .unwrap_or(nonzero!(60u32)),
            timeout_secs: config.timeout_secs,
        }
    }

    /// Sets the trading API base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the scrip master URL.
    #[must_use]
    pub fn with_scrip_master_url(mut self, url: impl Into<String>) -> Self {
        self.scrip_master_url = url.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

// =============================================================================
// LTP feed response
// =============================================================================

#[derive(Debug, Deserialize)]
struct LtpResponse {
    data: Option<HashMap<String, HashMap<String, LtpQuote>>>,
}

#[derive(Debug, Deserialize)]
struct LtpQuote {
    last_price: f64,
}

// =============================================================================
// DhanClient
// =============================================================================

/// Dhan REST API client.
///
/// Holds the session credentials; all trading calls send the
/// `access-token` header.
pub struct DhanClient {
    config: DhanClientConfig,
    http: Client,
    rate_limiter: Arc<
        RateLimiter<
            governor::state::NotKeyed,
            governor::state::InMemoryState,
            governor::clock::DefaultClock,
        >,
    >,
    auth: SessionAuth,
}

impl std::fmt::Debug for DhanClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DhanClient")
            .field("base_url", &self.config.base_url)
            .field("requests_per_minute", &self.config.requests_per_minute)
            .finish_non_exhaustive()
    }
}

impl DhanClient {
    /// Creates a new client with the given configuration and session.
    ///
    /// # Errors
    /// Returns `DhanError::Network` if the HTTP client cannot be built.
    pub fn new(config: DhanClientConfig, auth: SessionAuth) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DhanError::Network(format!("failed to build HTTP client: {e}")))?;

        let quota = Quota::per_minute(config.requests_per_minute);
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            config,
            http,
            rate_limiter,
            auth,
        })
    }

    /// Creates a production client with credentials from the environment.
    ///
    /// # Errors
    /// Returns `DhanError::Authentication` if credentials are missing.
    pub fn from_env() -> Result<Self> {
        Self::new(DhanClientConfig::default(), SessionAuth::from_env()?)
    }

    /// The trading API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// The session's client id.
    #[must_use]
    pub fn client_id(&self) -> &str {
        self.auth.client_id()
    }

    /// Validates an identifier used in a URL path.
    fn validate_identifier(id: &str) -> Result<&str> {
        if id.is_empty() {
            return Err(DhanError::Serialization(
                "identifier cannot be empty".to_string(),
            ));
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(DhanError::Serialization(format!(
                "invalid identifier: must contain only alphanumeric, hyphen, or underscore: {id}"
            )));
        }
        Ok(id)
    }

    /// Extracts the brokerage rejection message from an error response.
    async fn rejection_from(response: reqwest::Response) -> DhanError {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ApiErrorBody>(&text) {
            Ok(body) => {
                let message = body
                    .error_message
                    .or(body.error_type)
                    .unwrap_or_else(|| format!("HTTP {status}"));
                DhanError::OrderRejected(message)
            }
            Err(_) => DhanError::api(status, text),
        }
    }

    // =========================================================================
    // Order Endpoints
    // =========================================================================

    /// Submits an order via `POST /v2/orders`.
    ///
    /// One submission per call; the caller decides whether a failed leg is
    /// ever re-attempted (and only via explicit user action).
    ///
    /// # Errors
    /// `DhanError::OrderRejected` with the brokerage's message on a
    /// non-success response; `DhanError::Network`/`Timeout` on transport
    /// failure.
    pub async fn place_order(&self, order: &OrderRequest) -> Result<OrderReceipt> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/v2/orders", self.config.base_url);
        tracing::debug!(
            security_id = %order.security_id,
            side = %order.transaction_type,
            quantity = order.quantity,
            "POST {url}"
        );

        let response = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .header("access-token", self.auth.access_token())
            .json(order)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection_from(response).await);
        }

        let receipt = response.json::<OrderReceipt>().await?;
        tracing::info!(order_id = %receipt.order_id, status = ?receipt.order_status, "order placed");
        Ok(receipt)
    }

    /// Cancels a pending order via `DELETE /v2/orders/{order_id}`.
    ///
    /// # Errors
    /// Returns an error if the order cannot be cancelled.
    pub async fn cancel_order(&self, order_id: &str) -> Result<()> {
        let order_id = Self::validate_identifier(order_id)?;
        self.rate_limiter.until_ready().await;

        let url = format!("{}/v2/orders/{}", self.config.base_url, order_id);
        tracing::debug!("DELETE {url}");

        let response = self
            .http
            .delete(&url)
            .header("access-token", self.auth.access_token())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(DhanError::api(status.as_u16(), text));
        }
        Ok(())
    }

    // =========================================================================
    // Portfolio Endpoints
    // =========================================================================

    /// Fetches net positions via `GET /v2/positions`.
    ///
    /// # Errors
    /// Returns an error if the API call fails.
    pub async fn get_positions(&self) -> Result<Vec<NetPosition>> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/v2/positions", self.config.base_url);
        tracing::debug!("GET {url}");

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .header("access-token", self.auth.access_token())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(DhanError::api(status.as_u16(), text));
        }

        Ok(response.json::<Vec<NetPosition>>().await?)
    }

    /// Fetches the last traded price of an index via
    /// `POST /v2/marketfeed/ltp`.
    ///
    /// # Errors
    /// Returns an error if the API call fails or the index is absent from
    /// the response.
    pub async fn get_index_ltp(&self, security_id: u32) -> Result<Decimal> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/v2/marketfeed/ltp", self.config.base_url);
        let body = serde_json::json!({ "IDX_I": [security_id] });
        tracing::debug!(security_id, "POST {url}");

        let response = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .header("access-token", self.auth.access_token())
            .header("client-id", self.auth.client_id())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(DhanError::api(status.as_u16(), text));
        }

        let parsed = response.json::<LtpResponse>().await?;
        let last_price = parsed
            .data
            .as_ref()
            .and_then(|d| d.get("IDX_I"))
            .and_then(|seg| seg.get(&security_id.to_string()))
            .map(|q| q.last_price)
            .ok_or_else(|| {
                DhanError::Serialization(format!("no LTP for index scrip {security_id}"))
            })?;

        Decimal::try_from(last_price)
            .map_err(|e| DhanError::Serialization(format!("bad LTP value: {e}")))
    }

    // =========================================================================
    // Instrument Master
    // =========================================================================

    /// Downloads the raw scrip master CSV.
    ///
    /// The catalog cache calls this at most once per process.
    ///
    /// # Errors
    /// `DhanError::CatalogLoad` on any fetch failure or an empty body.
    pub async fn fetch_instrument_master(&self) -> Result<String> {
        self.rate_limiter.until_ready().await;

        let url = &self.config.scrip_master_url;
        tracing::info!("fetching instrument master from {url}");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| DhanError::catalog_load(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DhanError::catalog_load(format!(
                "scrip master fetch returned HTTP {status}"
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| DhanError::catalog_load(e.to_string()))?;
        if text.trim().is_empty() {
            return Err(DhanError::catalog_load("scrip master body is empty"));
        }
        Ok(text)
    }
}
