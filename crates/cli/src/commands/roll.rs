//! Roll the live ladder one step up or down.
//!
//! The ladder is re-derived from live positions on every invocation. A roll
//! is refused outright unless all three tracked strikes hold a confirmed
//! short straddle; that derivation doubles as the enable gate.

use crate::commands::{print_outcome, print_reconcile, Session};
use crate::prompt::CliGate;
use anyhow::Result;
use straddle_engine::TransitionOutcome;

/// Which way to shift the ladder.
#[derive(Debug, Clone, Copy)]
pub enum RollDirection {
    Up,
    Down,
}

/// Buys back the straddle at one end and sells a new one past the other.
pub async fn run_roll(session: &Session, gate: CliGate, direction: RollDirection) -> Result<()> {
    let ladder = session.live_ladder().await?;
    println!("Live ladder: {ladder}");

    let mut roller = session.roller(gate).with_ladder(ladder);
    let outcome = match direction {
        RollDirection::Up => roller.roll_up().await?,
        RollDirection::Down => roller.roll_down().await?,
    };

    if print_outcome(&outcome) {
        if let TransitionOutcome::Executed(report) = &outcome {
            print_reconcile(session, &report.ladder).await?;
        }
    }
    Ok(())
}
