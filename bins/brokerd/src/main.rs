//! OpenBrokerage engine daemon
//!
//! This is the main entry point for the brokerage engine. It wires the
//! stores, the order manager, the settlement ledger, the matching worker
//! and the expiration scheduler, then runs until Ctrl+C.
//!
//! The market-data collaborator feeds the engine through the event
//! channel created here; the order submission and cancellation
//! boundaries talk to the [`OrderManager`] handle.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use cli::{Cli, Commands};
use config::{
    generate_default_config, load_config, save_config, validate_config, BrokerageConfig,
};
use ledger::InMemoryLedgerStore;
use matching_engine::{MatchingEngine, MatchingWorker, QuoteBoard};
use observability::{init_logging, EngineMetrics, LogFormat};
use oms::{InMemoryOrderStore, OrderManager};
use scheduler::ExpirationScheduler;
use settlement::{FeeSchedule, LogNotifier, SettlementLedger};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Start {
            config,
            log_format,
            metrics_port,
        } => {
            let format: LogFormat = log_format
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;
            init_logging("brokerd", format)?;

            if let Some(port) = metrics_port {
                observability::init_metrics(port)?;
            }

            let config = load_and_check(&config)?;
            run_engine(config).await
        }
        Commands::Validate { config } => {
            init_logging("brokerd", LogFormat::Compact)?;
            validate_command(&config)
        }
        Commands::Init { output } => {
            init_logging("brokerd", LogFormat::Compact)?;
            init_command(&output)
        }
    }
}

fn load_and_check(path: &Path) -> Result<BrokerageConfig> {
    let config = load_config(path)?;
    let report = validate_config(&config);

    for warning in &report.warnings {
        warn!(field = %warning.field, message = %warning.message, "Configuration warning");
    }

    if !report.is_valid() {
        for err in &report.errors {
            error!("{}", err);
        }
        anyhow::bail!("Cannot start engine due to configuration errors");
    }

    Ok(config)
}

async fn run_engine(config: BrokerageConfig) -> Result<()> {
    info!(
        name = %config.brokerage.name,
        version = %config.brokerage.version,
        "Starting brokerage engine"
    );

    let metrics = EngineMetrics::new();
    let orders = Arc::new(InMemoryOrderStore::new());
    let ledger = Arc::new(InMemoryLedgerStore::new());
    let fees = FeeSchedule::new(&config.fees);

    let settlement = Arc::new(SettlementLedger::new(
        orders.clone(),
        ledger.clone(),
        fees.clone(),
        Arc::new(LogNotifier),
        metrics.clone(),
    ));

    let board = Arc::new(QuoteBoard::new());
    let manager = Arc::new(OrderManager::new(
        orders.clone(),
        settlement.clone(),
        board.clone(),
        config.trading.clone(),
        metrics.clone(),
    ));

    let engine = Arc::new(MatchingEngine::new(
        orders.clone(),
        ledger.clone(),
        settlement,
        fees,
    ));

    // The market-data collaborator publishes into this channel; the
    // submission boundary drives `manager`.
    let (event_tx, event_rx) = mpsc::channel(config.matching.event_channel_capacity);
    let _submission_handle = manager.clone();
    let _feed_handle = event_tx;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let worker = MatchingWorker::new(engine, board, event_rx);
    let worker_task = tokio::spawn(worker.run(shutdown_rx.clone()));

    let expiration = ExpirationScheduler::new(
        orders,
        manager,
        config.scheduler.clone(),
        metrics,
    );
    let scheduler_task = tokio::spawn(async move { expiration.run(shutdown_rx).await });

    info!("Engine running, press Ctrl+C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    info!("Shutdown signal received");
    shutdown_tx.send(true).ok();

    worker_task.await.ok();
    scheduler_task.await.ok();

    info!("Engine stopped");
    Ok(())
}

fn validate_command(path: &Path) -> Result<()> {
    info!(path = ?path, "Validating configuration");

    let config = match load_config(path) {
        Ok(c) => c,
        Err(e) => {
            error!(%e, "Failed to load configuration");
            anyhow::bail!(e);
        }
    };

    let report = validate_config(&config);

    println!("\n=== Configuration Validation Report ===\n");

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    println!("Brokerage: {}", config.brokerage.name);
    println!("Version: {}", config.brokerage.version);
    println!("Order ceiling: {}", config.trading.max_order_quantity);
    println!(
        "Fees: commission {} (min {}), sell tax {}",
        config.fees.commission_rate, config.fees.commission_min, config.fees.sell_tax_rate
    );

    Ok(())
}

fn init_command(output_path: &Path) -> Result<()> {
    info!(?output_path, "Initializing new configuration file");

    let config = generate_default_config();

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }

    save_config(&config, output_path)?;

    println!("[ok] Configuration file created successfully!");
    println!();
    println!("Location: {:?}", output_path);
    println!();
    println!("Next steps:");
    println!(
        "  1. Run 'brokerd validate --config {:?}' to check the configuration",
        output_path
    );
    println!(
        "  2. Run 'brokerd start --config {:?}' to start the engine",
        output_path
    );

    Ok(())
}
