use std::process::ExitCode;

use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rail_ingest::config::IngestConfig;
use rail_ingest::erail::ErailClient;
use rail_ingest::error::SetupError;
use rail_ingest::ntes::NtesClient;
use rail_ingest::publish::{LiveSink, ParseableSink, ValkeyChannel};
use rail_ingest::scheduler::Scheduler;
use rail_ingest::scrape::Scraper;
use rail_ingest::store::{CachedReferenceStore, PgReferenceStore};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match IngestConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let store = match PgReferenceStore::connect(&config.pg()).await {
        Ok(store) => CachedReferenceStore::new(store, &config.route_cache()),
        Err(e) => {
            error!(error = %e, "Reference store unreachable, giving up");
            return ExitCode::FAILURE;
        }
    };

    let scraper = match build_scraper(&config) {
        Ok(scraper) => scraper,
        Err(e) => {
            error!(error = %e, "Failed to build scraper");
            return ExitCode::FAILURE;
        }
    };

    let parseable = match ParseableSink::new(config.parseable()) {
        Ok(sink) => sink,
        Err(e) => {
            error!(error = %e, "Failed to build Parseable sink");
            return ExitCode::FAILURE;
        }
    };

    let live = match ValkeyChannel::new(&config.valkey()) {
        Ok(live) => live,
        Err(e) => {
            error!(error = %e, "Invalid Valkey address");
            return ExitCode::FAILURE;
        }
    };
    live.warm_up().await;
    let sink = LiveSink::new(parseable, live);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let scheduler = Scheduler::new(scraper, store, sink, config.scheduler());
    scheduler.run(shutdown_rx).await;

    ExitCode::SUCCESS
}

fn build_scraper(config: &IngestConfig) -> Result<Scraper<NtesClient, ErailClient>, SetupError> {
    let ntes = NtesClient::new(config.ntes())?;
    let erail = ErailClient::new(config.erail())?;
    Scraper::new(ntes, erail)
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
