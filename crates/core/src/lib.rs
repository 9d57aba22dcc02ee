//! Core domain for the NIFTY straddle ladder assistant.
//!
//! This crate provides:
//! - Strike/leg/position value types and the three-strike [`ladder::Ladder`]
//!   with its pure transition arithmetic
//! - Free-text parsers for the spot price and position rows
//! - Collaborator traits (market snapshot provider, confirmation gate)
//! - Configuration types and the figment-based loader
//!
//! No I/O happens here; the exchange and CLI crates supply the live
//! collaborators.

pub mod config;
pub mod config_loader;
pub mod ladder;
pub mod parse;
pub mod traits;
pub mod types;

pub use config::{AppConfig, DhanConfig, StrategyConfig};
pub use config_loader::ConfigLoader;
pub use ladder::{Ladder, LadderError, RollPlan};
pub use parse::{
    parse_position_label, parse_position_row, parse_signed_quantity, parse_spot_price,
    ParseError,
};
pub use traits::{AutoApprove, ConfirmationGate, MarketSnapshotProvider, RawPositionRow};
pub use types::{OptionLeg, OptionType, Position, Strike, TransactionSide};
