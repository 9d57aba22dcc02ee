//! Engine-level error taxonomy.

use straddle_core::{LadderError, ParseError};
use straddle_dhan::DhanError;
use thiserror::Error;

/// Errors surfaced by ladder transitions and reconciliation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A roll was requested without an active three-strike ladder.
    #[error(transparent)]
    InvalidState(#[from] LadderError),

    /// The spot price could not be derived; the transition is aborted with
    /// no side effects.
    #[error(transparent)]
    PriceParse(#[from] ParseError),

    /// Brokerage/catalog failure.
    #[error(transparent)]
    Dhan(#[from] DhanError),

    /// The snapshot provider failed to deliver a world view.
    #[error("snapshot provider failure: {0}")]
    Snapshot(String),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
