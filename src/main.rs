use ferrumkv::{logging, persistence, web, Config, PersistConfig, PersistenceScheduler, StorageEngine};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    logging::init_logging(config.log_format);
    info!("FerrumKV starting...");

    // Seed the store from the last snapshot, an unreadable file means an empty store
    let engine = Arc::new(StorageEngine::new());
    engine.restore(persistence::load_or_empty(&config.snapshot_path));
    info!("Store ready with {} records", engine.len());

    let shutdown = CancellationToken::new();

    let persist_handle = PersistenceScheduler::new(
        engine.clone(),
        PersistConfig {
            path: config.snapshot_path.clone(),
            interval: config.persist_interval,
        },
    )
    .spawn(shutdown.clone());

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received");
                signal_token.cancel();
            }
            Err(e) => error!("Unable to listen for shutdown signal: {}", e),
        }
    });

    if let Err(e) = web::run_web_server(config.addr, engine, shutdown.clone()).await {
        error!("Web server error: {:#}", e);
    }

    // The scheduler writes one last snapshot once cancelled
    shutdown.cancel();
    if let Err(e) = persist_handle.await {
        error!("Persistence task failed: {}", e);
    }

    info!("FerrumKV stopped");
}
