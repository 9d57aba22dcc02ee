//! Position reconciliation: compare live positions against the tracked
//! ladder and gate the roll actions.
//!
//! A tracked strike is "confirmed live" only when both a short CALL and a
//! short PUT exist at exactly that strike. Rolls are enabled only when the
//! ladder holds three strikes and all three are confirmed. This module
//! never mutates the ladder; it only reads the world and reports.

use crate::error::{EngineError, Result};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use straddle_core::{
    parse_position_row, Ladder, LadderError, MarketSnapshotProvider, OptionType, Position,
    RawPositionRow, Strike,
};
use tracing::{debug, info};

/// Which roll actions are currently allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionGate {
    /// Roll up is enabled.
    pub roll_up: bool,
    /// Roll down is enabled.
    pub roll_down: bool,
}

impl ActionGate {
    /// Gate with both actions disabled.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            roll_up: false,
            roll_down: false,
        }
    }

    /// True when rolls may proceed.
    #[must_use]
    pub fn allows_roll(&self) -> bool {
        self.roll_up && self.roll_down
    }
}

/// Parses raw rows into typed positions, skipping unparseable rows.
#[must_use]
pub fn parse_positions(rows: &[RawPositionRow]) -> Vec<Position> {
    rows.iter()
        .filter_map(|row| parse_position_row(&row.label, &row.quantity))
        .collect()
}

/// True when a short straddle exists at `strike`: a negative-quantity CALL
/// and a negative-quantity PUT, both at exactly that strike.
#[must_use]
pub fn is_straddle_live(strike: Strike, positions: &[Position]) -> bool {
    let short_at = |option_type: OptionType| {
        positions
            .iter()
            .any(|p| p.strike == strike && p.option_type == option_type && p.is_short())
    };
    short_at(OptionType::Call) && short_at(OptionType::Put)
}

/// The tracked strikes whose straddles are confirmed live.
#[must_use]
pub fn confirmed_strikes(ladder: &Ladder, positions: &[Position]) -> Vec<Strike> {
    ladder
        .strikes()
        .iter()
        .copied()
        .filter(|s| is_straddle_live(*s, positions))
        .collect()
}

/// Computes the action gate for the ladder against live positions.
#[must_use]
pub fn action_gate(ladder: &Ladder, positions: &[Position]) -> ActionGate {
    if !ladder.is_active() {
        return ActionGate::disabled();
    }
    let all_confirmed = confirmed_strikes(ladder, positions).len() == 3;
    ActionGate {
        roll_up: all_confirmed,
        roll_down: all_confirmed,
    }
}

/// Every strike holding any short option position.
#[must_use]
pub fn short_strikes(positions: &[Position]) -> BTreeSet<Strike> {
    positions
        .iter()
        .filter(|p| p.is_short())
        .map(|p| p.strike)
        .collect()
}

/// Re-derives a candidate ladder from live positions: the strikes with a
/// confirmed short straddle.
///
/// # Errors
/// `LadderError::InvalidState` unless exactly three such strikes exist.
pub fn derive_ladder(positions: &[Position]) -> std::result::Result<Ladder, LadderError> {
    let strikes: Vec<Strike> = short_strikes(positions)
        .into_iter()
        .filter(|s| is_straddle_live(*s, positions))
        .collect();
    Ladder::from_observed(strikes)
}

/// One reconciliation pass over the world.
#[derive(Debug)]
pub struct ReconcileReport {
    /// Parsed live positions.
    pub positions: Vec<Position>,
    /// Tracked strikes confirmed live.
    pub confirmed: Vec<Strike>,
    /// Resulting action gate.
    pub gate: ActionGate,
}

/// Periodic reconciliation monitor.
///
/// Runs on the same task as transitions; a tick therefore never observes a
/// half-executed order sequence.
pub struct ReconcileMonitor {
    provider: Arc<dyn MarketSnapshotProvider>,
    interval: Duration,
}

impl ReconcileMonitor {
    /// Creates a monitor over the given provider.
    pub fn new(provider: Arc<dyn MarketSnapshotProvider>, interval: Duration) -> Self {
        Self { provider, interval }
    }

    /// Performs one reconciliation pass against the tracked ladder.
    ///
    /// # Errors
    /// `EngineError::Snapshot` when the provider cannot deliver rows.
    pub async fn tick(&self, ladder: &Ladder) -> Result<ReconcileReport> {
        let rows = self
            .provider
            .position_rows()
            .await
            .map_err(|e| EngineError::Snapshot(e.to_string()))?;
        let positions = parse_positions(&rows);
        let confirmed = confirmed_strikes(ladder, &positions);
        let gate = action_gate(ladder, &positions);
        debug!(
            tracked = ladder.strikes().len(),
            confirmed = confirmed.len(),
            roll_enabled = gate.allows_roll(),
            "reconciliation tick"
        );
        Ok(ReconcileReport {
            positions,
            confirmed,
            gate,
        })
    }

    /// Runs the fixed-interval reconciliation loop, logging each verdict.
    ///
    /// `max_ticks` bounds the loop for tests and one-shot status checks;
    /// `None` runs until the task is dropped.
    ///
    /// # Errors
    /// Propagates the first snapshot failure.
    pub async fn watch(&self, ladder: &Ladder, max_ticks: Option<u64>) -> Result<()> {
        let mut interval = tokio::time::interval(self.interval);
        let mut ticks = 0u64;
        loop {
            interval.tick().await;
            let report = self.tick(ladder).await?;
            info!(
                ladder = %ladder,
                confirmed = ?report.confirmed,
                roll_enabled = report.gate.allows_roll(),
                "positions reconciled"
            );
            ticks += 1;
            if matches!(max_ticks, Some(max) if ticks >= max) {
                return Ok(());
            }
        }
    }
}
