//! Collaborator seams between the core and the outside world.
//!
//! The live implementations sit in the exchange and CLI crates; tests use
//! in-memory fakes so the state machine runs against synthetic snapshots.

use anyhow::Result;
use async_trait::async_trait;

/// A raw position row before parsing: instrument display label plus the
/// quantity as display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPositionRow {
    /// Free-text instrument label, e.g. `"NIFTY 28 AUG 24800 CALL"`.
    pub label: String,
    /// Free-text signed quantity, e.g. `"-50"`.
    pub quantity: String,
}

/// Supplies the assistant's view of the world: the spot price snippet and
/// the current position rows.
#[async_trait]
pub trait MarketSnapshotProvider: Send + Sync {
    /// The display text containing the underlying's spot price.
    async fn spot_price_text(&self) -> Result<String>;

    /// Current position rows, one per open contract.
    async fn position_rows(&self) -> Result<Vec<RawPositionRow>>;
}

/// Synchronous yes/no gate invoked before a transition's first order.
///
/// Declining must abort the transition with zero side effects; this is the
/// only cancellation point once an action is requested.
pub trait ConfirmationGate: Send + Sync {
    /// Presents `prompt` and returns whether the operator approved.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Gate that approves everything. Used by `--yes` and by tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

impl ConfirmationGate for AutoApprove {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}
