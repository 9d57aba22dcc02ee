//! One-shot view of the spot, live positions, and the roll gate.

use crate::commands::Session;
use anyhow::Result;
use straddle_core::MarketSnapshotProvider;
use straddle_core::{parse_spot_price, Ladder, Strike};
use straddle_engine::{action_gate, derive_ladder, parse_positions};

/// Prints spot, positions, the derived ladder, and whether rolls are
/// enabled.
pub async fn run_status(session: &Session) -> Result<()> {
    let snippet = session.provider.spot_price_text().await?;
    match parse_spot_price(&snippet) {
        Ok(spot) => {
            let center = Strike::round_from_spot(spot, session.config.strategy.strike_step);
            println!("Spot:   {spot} (nearest strike {center})");
        }
        Err(e) => println!("Spot:   unavailable ({e})"),
    }

    let rows = session.provider.position_rows().await?;
    let positions = parse_positions(&rows);
    if positions.is_empty() {
        println!("Positions: none");
    } else {
        println!("Positions:");
        for p in &positions {
            println!("  {:>6} {} {}", p.quantity, p.strike, p.option_type);
        }
    }

    let ladder = derive_ladder(&positions).unwrap_or_else(|_| Ladder::empty());
    let gate = action_gate(&ladder, &positions);
    println!("Ladder: {ladder}");
    println!(
        "Rolls:  {}",
        if gate.allows_roll() {
            "enabled"
        } else {
            "disabled (need three confirmed short straddles)"
        },
    );
    Ok(())
}
