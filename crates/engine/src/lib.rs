//! Straddle ladder engine: transition state machine, order pacing, and
//! position reconciliation.
//!
//! The engine owns the three-strike short-straddle ladder. Transitions
//! (initiate, roll up, roll down) are planned in `straddle-core`, gated by a
//! confirmation prompt, and executed against the brokerage strictly
//! sequentially with pacing between legs. Reconciliation periodically
//! compares live positions against the tracked ladder and enables or
//! disables further rolls.

pub mod error;
pub mod pacing;
pub mod reconcile;
pub mod roller;

pub use error::{EngineError, Result};
pub use pacing::{IntervalPacer, NoopPacer, Pacer};
pub use reconcile::{
    action_gate, confirmed_strikes, derive_ladder, is_straddle_live, parse_positions,
    ActionGate, ReconcileMonitor, ReconcileReport,
};
pub use roller::{
    LegDetail, LegOutcome, StraddleRoller, TransitionOutcome, TransitionReport,
};
