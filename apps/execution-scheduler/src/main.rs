//! Execution Scheduler Binary
//!
//! Restores persisted engine state and drives it against the paper venue.
//! The venue and the pricing both use the static quotes from
//! `engine.quotes`; contracts without a quote price at the instruction's own
//! price and rest until they time out.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin execution-scheduler
//! ```
//!
//! # Environment Variables
//!
//! - `SCHEDULER_CONFIG`: Path to the YAML config (default: config.yaml)
//! - `RUST_LOG`: Log filter (default: from `observability.logging.level`)

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use execution_scheduler::application::ports::StateRepositoryPort;
use execution_scheduler::application::services::{
    AutoSaveService, ExecutionCoordinator, ExecutionLoop,
};
use execution_scheduler::config::{Config, ConfigError, load_config};
use execution_scheduler::infrastructure::events::LoggingEventPublisher;
use execution_scheduler::infrastructure::persistence::JsonFileStateRepository;
use execution_scheduler::infrastructure::venue::PaperVenue;
use execution_scheduler::observability::{LogFormat, MetricsConfig, init_metrics, init_tracing};
use execution_scheduler::ContractId;
use tokio::signal;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

type Engine = ExecutionLoop<PaperVenue, JsonFileStateRepository, LoggingEventPublisher>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let config = read_config()?;
    let logging = &config.observability.logging;
    init_tracing(&logging.level, LogFormat::from_name(&logging.format))?;

    tracing::info!(
        timeout_secs = config.executor.timeout_secs,
        max_retries = config.executor.max_retries,
        persistence = config.persistence.enabled,
        "Starting execution scheduler"
    );

    if config.observability.metrics.enabled {
        let addr = config.observability.metrics.socket_addr()?;
        init_metrics(&MetricsConfig::with_addr(addr))?;
        tracing::info!(%addr, "Metrics exporter listening");
    }

    let mut engine = build_engine(&config).await?;
    run(&mut engine, &config).await;

    engine
        .shutdown(Utc::now())
        .await
        .context("final state save failed")?;
    tracing::info!("Execution scheduler stopped");
    Ok(())
}

fn read_config() -> anyhow::Result<Config> {
    let path = std::env::var("SCHEDULER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    match load_config(Some(&path)) {
        Ok(config) => Ok(config),
        Err(ConfigError::ReadError { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            Ok(Config::default())
        }
        Err(e) => Err(e).with_context(|| format!("loading {path}")),
    }
}

async fn build_engine(config: &Config) -> anyhow::Result<Engine> {
    let repository = Arc::new(JsonFileStateRepository::new(&config.persistence.path));

    let coordinator = if config.persistence.enabled {
        match repository.load().await.context("restoring engine state")? {
            Some(snapshot) => {
                tracing::info!(
                    path = %repository.path().display(),
                    saved_at = %snapshot.saved_at,
                    orders = snapshot.scheduler.orders.len(),
                    managed = snapshot.executor.orders.len(),
                    "Restored engine state"
                );
                ExecutionCoordinator::from_snapshot(snapshot)
            }
            None => fresh_coordinator(config),
        }
    } else {
        fresh_coordinator(config)
    };

    let venue = Arc::new(PaperVenue::new());
    for (contract, quote) in &config.engine.quotes {
        venue.set_quote(&ContractId::new(contract.as_str()), *quote).await;
    }
    tracing::info!(contracts = config.engine.quotes.len(), "Paper venue quotes seeded");

    let engine = ExecutionLoop::new(coordinator, venue, Arc::new(LoggingEventPublisher::new()));
    if !config.persistence.enabled {
        return Ok(engine);
    }

    let mut auto_save =
        AutoSaveService::with_interval_secs(repository, config.persistence.auto_save_interval_secs);
    auto_save.reset(Utc::now());
    Ok(engine.with_auto_save(auto_save))
}

fn fresh_coordinator(config: &Config) -> ExecutionCoordinator {
    ExecutionCoordinator::with_config(config.scheduler.clone(), config.executor.clone())
}

async fn run(engine: &mut Engine, config: &Config) {
    let tick = config.executor.price_tick;
    let quotes = &config.engine;
    let quote_for = move |contract: &ContractId| quotes.quote_for(contract, tick);

    let mut interval = tokio::time::interval(Duration::from_millis(config.engine.tick_interval_ms));
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let report = engine.tick(Utc::now(), quote_for).await;
                if report.released + report.fills + report.timeouts > 0 {
                    tracing::debug!(
                        released = report.released,
                        fills = report.fills,
                        timeouts = report.timeouts,
                        retries = report.retries,
                        "Tick processed"
                    );
                }
            }
            () = &mut shutdown => break,
        }
    }
    for order in engine.coordinator().scheduler().active_orders() {
        tracing::info!(
            order_id = %order.id(),
            kind = %order.kind(),
            filled_qty = order.filled_qty(),
            total_qty = order.total_qty(),
            "Advanced order still working at shutdown"
        );
    }
}

/// Load `.env` from the working directory or the nearest ancestor.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }
    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, initiating shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, initiating shutdown"),
    }
}
