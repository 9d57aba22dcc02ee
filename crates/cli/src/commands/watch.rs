//! Periodic position reconciliation loop.

use crate::commands::Session;
use anyhow::Result;
use clap::Args;
use straddle_core::Ladder;

/// Arguments for the watch command.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Stop after this many reconciliation passes; runs until interrupted
    /// when omitted.
    #[arg(long)]
    pub ticks: Option<u64>,
}

/// Reconciles live positions against the ladder at the configured interval.
pub async fn run_watch(session: &Session, args: WatchArgs) -> Result<()> {
    let ladder = match session.live_ladder().await {
        Ok(ladder) => {
            println!("Tracking ladder: {ladder}");
            ladder
        }
        Err(e) => {
            println!("No live ladder ({e:#}); watching with rolls disabled.");
            Ladder::empty()
        }
    };

    session.monitor().watch(&ladder, args.ticks).await?;
    Ok(())
}
