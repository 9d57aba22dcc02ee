use clap::{Parser, Subcommand};

mod commands;
mod prompt;

use commands::{InitiateArgs, RollDirection, Session, WatchArgs};
use prompt::CliGate;

#[derive(Parser)]
#[command(name = "straddle")]
#[command(about = "NIFTY three-strike short-straddle ladder assistant", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true, default_value = "config/Config.toml")]
    config: String,

    /// Skip confirmation prompts
    #[arg(short = 'y', long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sell three fresh straddles centered on the spot
    Initiate(InitiateArgs),
    /// Buy back the lowest straddle and sell a new one above the highest
    RollUp,
    /// Buy back the highest straddle and sell a new one below the lowest
    RollDown,
    /// Show spot, live positions, and whether rolls are enabled
    Status,
    /// Reconcile positions against the ladder on a fixed interval
    Watch(WatchArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let session = Session::connect(&cli.config)?;
    let gate = CliGate::from_flag(cli.yes);

    match cli.command {
        Commands::Initiate(args) => {
            commands::run_initiate(&session, gate, args).await?;
        }
        Commands::RollUp => {
            commands::run_roll(&session, gate, RollDirection::Up).await?;
        }
        Commands::RollDown => {
            commands::run_roll(&session, gate, RollDirection::Down).await?;
        }
        Commands::Status => {
            commands::run_status(&session).await?;
        }
        Commands::Watch(args) => {
            commands::run_watch(&session, args).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn initiate_accepts_price_and_yes() {
        let cli = Cli::parse_from(["straddle", "initiate", "--price", "24837.85", "--yes"]);
        assert!(cli.yes);
        match cli.command {
            Commands::Initiate(args) => {
                assert_eq!(args.price.map(|p| p.to_string()), Some("24837.85".into()));
            }
            _ => panic!("expected initiate"),
        }
    }

    #[test]
    fn watch_tick_bound_parses() {
        let cli = Cli::parse_from(["straddle", "watch", "--ticks", "3"]);
        match cli.command {
            Commands::Watch(args) => assert_eq!(args.ticks, Some(3)),
            _ => panic!("expected watch"),
        }
    }
}
