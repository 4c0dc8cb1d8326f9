use clap::Parser;
use credint::api::{start_api_server, AppState};
use credint::cache::{self, DurableCache, InMemoryCache};
use credint::cli::{Cli, Commands};
use credint::config::AppConfig;
use credint::error::{CredintError, Result};
use credint::orchestrator::{Orchestrator, RefreshSettings};
use credint::scoring::Scorer;
use credint::services::{RefreshMetrics, RefreshScheduler};
use credint::signals::{self, SignalCollector};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

mod main_runtime;

use main_runtime::{init_logging, init_logging_simple, shutdown_signal};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command();
    let mut config = AppConfig::load_from(&cli.config)?;

    match command {
        Commands::Serve { .. } => init_logging(&config.logging),
        _ => init_logging_simple(),
    }

    if let Commands::Serve { port: Some(port) } = command {
        config.api.port = port;
    }
    if let Err(errors) = config.validate() {
        for e in &errors {
            error!("Invalid configuration: {}", e);
        }
        return Err(CredintError::Validation(errors.join("; ")));
    }

    match command {
        Commands::Serve { .. } => run_serve(config).await,
        Commands::Refresh => run_refresh(&config).await,
        Commands::Score { entity } => run_score(&config, &entity).await,
        Commands::History { entity } => run_history(&config, &entity).await,
    }
}

async fn connect_cache(config: &AppConfig) -> Arc<dyn DurableCache> {
    match cache::connect(&config.cache).await {
        Ok(cache) => cache,
        Err(e) => {
            warn!("Cache backend unavailable ({}), using in-process cache", e);
            Arc::new(InMemoryCache::new())
        }
    }
}

async fn build_orchestrator(config: &AppConfig) -> Result<Arc<Orchestrator>> {
    let cache = connect_cache(config).await;
    let source = signals::build_source(&config.signals)?;
    let collector = SignalCollector::new(
        source,
        config.signals.entities.clone(),
        config.signals.fetch_timeout(),
    );

    let scorer = Scorer::load(config.model.path.as_deref())?;
    info!("Scoring model: {}", scorer.model_name());

    Ok(Arc::new(Orchestrator::new(
        collector,
        Arc::new(scorer),
        cache,
        RefreshSettings::from(&config.refresh),
        Arc::new(RefreshMetrics::new()),
    )))
}

async fn run_serve(config: AppConfig) -> Result<()> {
    info!("Starting credint v{}", env!("CARGO_PKG_VERSION"));
    let orchestrator = build_orchestrator(&config).await?;
    info!(
        "Tracking {} entities: {}",
        orchestrator.entities().len(),
        orchestrator.entities().join(", ")
    );

    if config.refresh.run_on_startup {
        let batch = orchestrator.refresh_all().await;
        info!("Startup refresh scored {} entities", batch.entity_count);
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = RefreshScheduler::new(orchestrator.clone(), config.refresh.interval());
    let scheduler_handle = tokio::spawn(scheduler.run(shutdown_rx));

    let state = AppState::new(orchestrator.clone());
    let served = start_api_server(
        state,
        &config.api.host,
        config.api.port,
        shutdown_signal(),
    )
    .await;

    info!("Shutting down...");
    let _ = shutdown_tx.send(true);
    if let Err(e) = scheduler_handle.await {
        error!("Scheduler task failed: {}", e);
    }
    orchestrator.metrics().log_status();

    served
}

async fn run_refresh(config: &AppConfig) -> Result<()> {
    let orchestrator = build_orchestrator(config).await?;
    let batch = orchestrator.refresh_all().await;

    if batch.is_empty() {
        println!("No scores produced (no financial data available)");
        return Ok(());
    }

    println!("{:<8} {:>7}  {:<12}", "ENTITY", "SCORE", "RISK");
    for result in batch.scores.values() {
        let marker = if result.is_fallback() { " *" } else { "" };
        println!(
            "{:<8} {:>7.1}  {:<12}{}",
            result.entity_id,
            result.score,
            result.risk_level.label(),
            marker
        );
    }
    println!(
        "\n{} entities scored at {} ({} fallback, marked *)",
        batch.entity_count,
        batch.processing_timestamp.to_rfc3339(),
        batch.fallback_count()
    );
    Ok(())
}

async fn run_score(config: &AppConfig, entity: &str) -> Result<()> {
    let orchestrator = build_orchestrator(config).await?;
    let result = orchestrator.score_one(&entity.to_uppercase()).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn run_history(config: &AppConfig, entity: &str) -> Result<()> {
    let orchestrator = build_orchestrator(config).await?;
    let history = orchestrator.get_history(&entity.to_uppercase()).await;
    if history.is_empty() {
        println!("No history for {}", entity.to_uppercase());
        return Ok(());
    }
    println!("{}", serde_json::to_string_pretty(&history)?);
    Ok(())
}
