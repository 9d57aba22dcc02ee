use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub dhan: DhanConfig,
    pub strategy: StrategyConfig,
}

/// Dhan API endpoints and pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DhanConfig {
    /// Trading API base URL.
    pub api_url: String,
    /// Instrument master (scrip master) CSV URL.
    pub scrip_master_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// API requests per minute limit.
    pub requests_per_minute: u32,
}

/// Strategy parameters for the straddle ladder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Underlying symbol as it appears in the scrip master.
    pub underlying: String,
    /// Security id of the underlying index (13 = NIFTY 50), used for the
    /// spot LTP feed.
    pub underlying_scrip: u32,
    /// Strike grid increment in rupees.
    pub strike_step: u32,
    /// Contracts per order (one NIFTY lot).
    pub lot_quantity: u32,
    /// Minimum pause between consecutive order submissions, in millis.
    pub order_pacing_ms: u64,
    /// Reconciliation tick interval in seconds.
    pub reconcile_interval_secs: u64,
    /// Weekly expiry weekday, 0 = Sunday .. 6 = Saturday.
    pub expiry_weekday: u8,
    /// On the expiry weekday itself, hours past this roll to the following
    /// week (market close).
    pub expiry_cutoff_hour: u32,
}

impl Default for DhanConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.dhan.co".to_string(),
            scrip_master_url: "https://images.dhan.co/api-data/api-scrip-master.csv"
                .to_string(),
            timeout_secs: 30,
            requests_per_minute: 60,
        }
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            underlying: "NIFTY".to_string(),
            underlying_scrip: 13,
            strike_step: 50,
            lot_quantity: 50,
            order_pacing_ms: 300,
            reconcile_interval_secs: 5,
            expiry_weekday: 4, // Thursday
            expiry_cutoff_hour: 16,
        }
    }
}
