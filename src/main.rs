//! Perception - command-line client for Aptos opinion markets.
//!
//! Creates markets and places trades through a wallet bridge, then waits
//! for the fullnode to confirm them.

use anyhow::Context;
use clap::{Parser, Subcommand};
use perception::config::{self, Config};
use perception::state::MarketForm;
use perception::{App, Side};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "perception", version, about)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a new binary market.
    CreateMarket {
        #[arg(long)]
        question: String,
        /// Resolution date, YYYY-MM-DD.
        #[arg(long)]
        date: String,
        /// Resolution time, HH:MM (local).
        #[arg(long)]
        time: String,
    },
    /// Buy YES or NO shares.
    Buy {
        #[arg(long)]
        market_id: u64,
        #[arg(long, default_value = "yes")]
        side: Side,
        /// Amount in uUSD.
        #[arg(long)]
        amount: String,
        /// Agreement percentage, 0-100.
        #[arg(long)]
        agreement: Option<u8>,
        /// Slippage tolerance in percent.
        #[arg(long)]
        slippage: Option<Decimal>,
    },
    /// Write the default configuration file.
    InitConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let _guard = init_logging();

    if let Command::InitConfig = cli.command {
        let path = Config::default()
            .save(cli.config)
            .context("Failed to write configuration")?;
        println!("Wrote {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    // Load configuration
    let config = Config::load(cli.config).context("Failed to load configuration")?;

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = cancel_tx.send(true);
        }
    });

    let app = App::new(config)
        .context("Failed to initialize client")?
        .with_cancel(cancel_rx);

    let report = match cli.command {
        Command::CreateMarket {
            question,
            date,
            time,
        } => {
            let mut form = MarketForm::new(question, date, time);
            app.create_market(&mut form).await
        }
        Command::Buy {
            market_id,
            side,
            amount,
            agreement,
            slippage,
        } => {
            let mut form = app.trade_form(market_id, side, amount);
            if let Some(agreement) = agreement {
                form.agreement_percentage = agreement;
            }
            if let Some(slippage) = slippage {
                form.slippage_percent = slippage;
            }
            app.trade(&mut form).await
        }
        Command::InitConfig => return Ok(ExitCode::SUCCESS),
    };

    println!("{}", report.notification());
    if let Some(hash) = report.hash() {
        println!("  transaction: {}", hash);
    }

    Ok(if report.outcome.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Log to stderr and to a daily file in the data directory.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "perception=info".into());
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    match prepare_log_dir() {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "perception.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
            Some(guard)
        }
        Err(_) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}

fn prepare_log_dir() -> perception::Result<PathBuf> {
    let dir = config::log_dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
