use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wifi_radar::adapters::{SampleStore, SystemClock};
use wifi_radar::application::Scheduler;
use wifi_radar::config::Config;
use wifi_radar::interface::http::create_router;
use wifi_radar::ports::LinkCollector;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("wifi_radar={},tower_http=info", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    config.validate()?;

    info!("Starting wifi-radar v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {:?}", config);

    let store = Arc::new(SampleStore::new(config.store_config()));

    let procfs = config.procfs_config();
    let collectors: Vec<Arc<dyn LinkCollector>> = config
        .interfaces
        .iter()
        .map(|name| Arc::new(procfs.collector(name.clone())) as Arc<dyn LinkCollector>)
        .collect();

    let scheduler = Scheduler::new(
        Arc::clone(&store),
        collectors,
        Arc::new(SystemClock::new()),
        config.interval,
    )
    .with_collect_timeout(config.collect_timeout());

    let cancel = CancellationToken::new();
    let collection = {
        let cancel = cancel.clone();
        tokio::spawn(async move { scheduler.run(cancel).await })
    };

    let static_dir = config.static_dir.clone();
    if !static_dir.is_dir() {
        warn!("Static directory {} not found, dashboard disabled", static_dir.display());
    }

    let app = create_router(Arc::clone(&store), Some(static_dir));
    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Listening on http://{}", addr);
    info!("  → API: http://{}/api/status", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel.clone(), Arc::clone(&store)))
        .await?;

    cancel.cancel();
    collection.await?;
    store.close();

    info!("Shut down cleanly");
    Ok(())
}

/// Resolves on Ctrl-C after stopping collection and ending live streams
async fn shutdown_signal(cancel: CancellationToken, store: Arc<SampleStore>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }

    info!("Shutdown requested");
    cancel.cancel();
    store.close();
}
