//! Open a fresh three-straddle ladder around the current spot.

use crate::commands::{print_outcome, print_reconcile, Session};
use crate::prompt::CliGate;
use anyhow::Result;
use clap::Args;
use rust_decimal::Decimal;
use straddle_core::MarketSnapshotProvider;
use straddle_engine::TransitionOutcome;

/// Arguments for the initiate command.
#[derive(Args, Debug)]
pub struct InitiateArgs {
    /// Spot price override; fetched from the market feed when omitted.
    #[arg(long)]
    pub price: Option<Decimal>,
}

/// Sells both legs at the centered strike and one step either side.
pub async fn run_initiate(session: &Session, gate: CliGate, args: InitiateArgs) -> Result<()> {
    let mut roller = session.roller(gate);

    let outcome = match args.price {
        Some(spot) => roller.initiate(spot).await?,
        None => {
            let snippet = session.provider.spot_price_text().await?;
            println!("Spot: {snippet}");
            roller.initiate_from_snippet(&snippet).await?
        }
    };

    if print_outcome(&outcome) {
        if let TransitionOutcome::Executed(report) = &outcome {
            print_reconcile(session, &report.ladder).await?;
        }
    }
    Ok(())
}
