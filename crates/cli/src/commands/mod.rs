//! CLI commands for the straddle ladder assistant.

pub mod initiate;
pub mod roll;
pub mod status;
pub mod watch;

pub use initiate::{run_initiate, InitiateArgs};
pub use roll::{run_roll, RollDirection};
pub use status::run_status;
pub use watch::{run_watch, WatchArgs};

use crate::prompt::CliGate;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use straddle_core::{AppConfig, ConfigLoader, Ladder};
use straddle_dhan::{
    CatalogCache, DhanClient, DhanClientConfig, DhanSnapshotProvider, SessionAuth,
};
use straddle_engine::{
    derive_ladder, parse_positions, IntervalPacer, LegDetail, ReconcileMonitor, StraddleRoller,
    TransitionOutcome, TransitionReport,
};

/// Shared per-invocation context: configuration, authenticated client, and
/// the collaborators built from them.
pub struct Session {
    pub config: AppConfig,
    pub client: Arc<DhanClient>,
    pub catalog: Arc<CatalogCache>,
    pub provider: Arc<DhanSnapshotProvider>,
}

impl Session {
    /// Loads configuration and builds the authenticated brokerage client.
    ///
    /// # Errors
    /// Fails when the config file is malformed or the `DHAN_ACCESS_TOKEN`
    /// and `DHAN_CLIENT_ID` environment variables are missing.
    pub fn connect(config_path: &str) -> Result<Self> {
        let config = ConfigLoader::load_from(config_path)?;
        let auth = SessionAuth::from_env().context("brokerage credentials")?;
        let client = Arc::new(DhanClient::new(
            DhanClientConfig::from_app(&config.dhan),
            auth,
        )?);
        let provider = Arc::new(DhanSnapshotProvider::new(
            Arc::clone(&client),
            config.strategy.underlying.clone(),
            config.strategy.underlying_scrip,
        ));
        Ok(Self {
            config,
            client,
            catalog: Arc::new(CatalogCache::new()),
            provider,
        })
    }

    /// Builds a roller with an empty ladder.
    pub fn roller(&self, gate: CliGate) -> StraddleRoller<CliGate, IntervalPacer> {
        StraddleRoller::new(
            Arc::clone(&self.client),
            Arc::clone(&self.catalog),
            self.config.strategy.clone(),
            gate,
            IntervalPacer::from_millis(self.config.strategy.order_pacing_ms),
        )
    }

    /// Builds the reconciliation monitor at the configured interval.
    pub fn monitor(&self) -> ReconcileMonitor {
        let provider: Arc<dyn straddle_core::MarketSnapshotProvider> =
            Arc::clone(&self.provider) as Arc<dyn straddle_core::MarketSnapshotProvider>;
        ReconcileMonitor::new(
            provider,
            Duration::from_secs(self.config.strategy.reconcile_interval_secs),
        )
    }

    /// Re-derives the ladder from live confirmed short straddles.
    ///
    /// The ladder is not persisted between invocations; the live book is
    /// the source of truth.
    ///
    /// # Errors
    /// Fails when positions cannot be fetched or do not form exactly three
    /// short straddles.
    pub async fn live_ladder(&self) -> Result<Ladder> {
        use straddle_core::MarketSnapshotProvider;
        let rows = self.provider.position_rows().await?;
        let positions = parse_positions(&rows);
        let ladder = derive_ladder(&positions)
            .context("live positions do not form a three-strike straddle ladder")?;
        Ok(ladder)
    }
}

/// Prints a transition outcome; returns whether orders were submitted.
pub fn print_outcome(outcome: &TransitionOutcome) -> bool {
    match outcome {
        TransitionOutcome::Declined => {
            println!("Declined; no orders were placed.");
            false
        }
        TransitionOutcome::Executed(report) => {
            print_report(report);
            true
        }
    }
}

fn print_report(report: &TransitionReport) {
    for leg in &report.legs {
        match &leg.detail {
            LegDetail::Placed(receipt) => {
                println!(
                    "  {:>4} {} -> order {} ({})",
                    leg.side.as_str(),
                    leg.leg,
                    receipt.order_id,
                    receipt.order_status.as_deref().unwrap_or("submitted"),
                );
            }
            LegDetail::Failed(err) => {
                println!("  {:>4} {} -> FAILED: {err}", leg.side.as_str(), leg.leg);
            }
        }
    }
    if report.all_placed() {
        println!("All legs submitted. Ladder: {}", report.ladder);
    } else {
        let failed = report.failures().count();
        println!(
            "{failed} leg(s) failed; review the brokerage order book. Ladder: {}",
            report.ladder
        );
    }
}

/// Runs one reconciliation pass and prints the verdict.
pub async fn print_reconcile(session: &Session, ladder: &Ladder) -> Result<()> {
    let report = session.monitor().tick(ladder).await?;
    let confirmed: Vec<String> = report.confirmed.iter().map(ToString::to_string).collect();
    println!(
        "Reconcile: {} position(s), confirmed strikes [{}], rolls {}",
        report.positions.len(),
        confirmed.join(", "),
        if report.gate.allows_roll() {
            "enabled"
        } else {
            "disabled"
        },
    );
    Ok(())
}
