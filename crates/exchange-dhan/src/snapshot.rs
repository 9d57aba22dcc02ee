//! REST-backed market snapshot provider.
//!
//! Serves the snapshot contract from the Dhan API, rendering each net
//! position into the display-row shape the core parsers expect
//! (`"<UNDERLYING> <EXPIRY> <STRIKE> <CALL|PUT>"` plus a signed quantity
//! string), so parsing stays in one place.

use crate::client::DhanClient;
use crate::types::NetPosition;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use straddle_core::{MarketSnapshotProvider, RawPositionRow};

/// Snapshot provider reading spot and positions from the Dhan API.
#[derive(Debug, Clone)]
pub struct DhanSnapshotProvider {
    client: Arc<DhanClient>,
    underlying: String,
    underlying_scrip: u32,
}

impl DhanSnapshotProvider {
    /// Creates a provider for the given underlying index.
    #[must_use]
    pub fn new(client: Arc<DhanClient>, underlying: impl Into<String>, underlying_scrip: u32) -> Self {
        Self {
            client,
            underlying: underlying.into(),
            underlying_scrip,
        }
    }

    /// Renders one API position into a display row, or `None` for
    /// non-option positions.
    fn render_row(&self, position: &NetPosition) -> Option<RawPositionRow> {
        let option_label = position.drv_option_type.as_deref()?;
        let strike = position.drv_strike_price?;
        let expiry = position.drv_expiry_date.as_deref().unwrap_or("-");
        Some(RawPositionRow {
            label: format!(
                "{} {} {} {}",
                self.underlying,
                expiry,
                strike.round() as i64,
                option_label
            ),
            quantity: position.net_qty.to_string(),
        })
    }
}

#[async_trait]
impl MarketSnapshotProvider for DhanSnapshotProvider {
    async fn spot_price_text(&self) -> Result<String> {
        let ltp = self.client.get_index_ltp(self.underlying_scrip).await?;
        Ok(ltp.to_string())
    }

    async fn position_rows(&self) -> Result<Vec<RawPositionRow>> {
        let positions = self.client.get_positions().await?;
        Ok(positions
            .iter()
            .filter_map(|p| self.render_row(p))
            .collect())
    }
}
