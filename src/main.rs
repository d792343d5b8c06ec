//! Camp Haven automator (v0.1)
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI ──▶ config ──▶ wallet::keys ──▶ BatchRunner
//!                                           │  per wallet, sequential
//!                                           ▼
//!                                 ┌───────────────────┐
//!                                 │  BrowserSession   │  Chromium page
//!                                 │  csrf → sign →    │──────────────▶ camphaven.xyz
//!                                 │  credentials →    │
//!                                 │  session          │
//!                                 └─────────┬─────────┘
//!                                           ▼
//!                                 ┌───────────────────┐
//!                                 │  AccountClient    │  in-page GraphQL
//!                                 │  checkin/referral │──────────────▶ absinthe gql
//!                                 │  stats            │
//!                                 └───────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use camphaven_automator::config::load_or_default;
use camphaven_automator::lifecycle::{signals, DailySchedule, Shutdown};
use camphaven_automator::observability::logging::init_logging;
use camphaven_automator::observability::metrics::init_metrics;
use camphaven_automator::orchestrator::{Action, BatchError, BatchReport, BatchRunner};
use camphaven_automator::ChromeLauncher;

#[derive(Parser)]
#[command(name = "camphaven")]
#[command(about = "Daily check-in, referral and stats automation for Camp Haven wallets", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the daily check-in for every wallet
    Checkin,
    /// Apply a referral code to every wallet
    Referral {
        #[arg(long)]
        code: String,
    },
    /// Show referral code and count for every wallet
    Stats,
    /// Referral (optional) followed by the daily check-in
    All {
        #[arg(long)]
        code: Option<String>,
    },
    /// Check in now, then every day at the configured time
    Auto,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Arc::new(load_or_default(cli.config.as_deref())?);

    init_logging(&config.observability);
    tracing::info!("camphaven v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(e) => tracing::error!(
                error = %e,
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let launcher = Arc::new(ChromeLauncher::new());
    let runner = BatchRunner::new(launcher, Arc::clone(&config));

    let action = match cli.command {
        Commands::Checkin => Action::Checkin,
        Commands::Referral { code } => Action::Referral(code),
        Commands::Stats => Action::Stats,
        Commands::All { code } => Action::All { referral: code },
        Commands::Auto => {
            let schedule = DailySchedule::from_config(&config.schedule)?;
            let shutdown = Shutdown::new();
            tokio::spawn(signals::listen(shutdown.clone()));

            // Keys are reloaded per run, so an empty key file at startup
            // only fails that run; the schedule still starts.
            let runner = &runner;
            schedule
                .run_now_and_daily(shutdown.subscribe(), move || async move {
                    run_batch(runner, &Action::Checkin).await
                })
                .await;

            tracing::info!("Shutdown complete");
            return Ok(());
        }
    };

    let report = run_batch(&runner, &action).await?;
    if !report.any_succeeded() {
        std::process::exit(1);
    }
    Ok(())
}

async fn run_batch(
    runner: &BatchRunner<ChromeLauncher>,
    action: &Action,
) -> Result<BatchReport, BatchError> {
    runner.run_configured(action).await.inspect_err(|e| {
        tracing::error!(error = %e, "Batch did not run");
    })
}
