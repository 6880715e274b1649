use fridge_energy_monitor::{
    api, poller,
    repositories::{CommandSink, ReadingSource, SupabaseClient},
    services::{DashboardService, DashboardSettings},
    Config,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!("Starting fridge-energy-monitor");

    let cfg_path = std::env::var("APP_CONFIG").unwrap_or_else(|_| "config/config.yaml".into());
    let cfg = Config::load(&cfg_path)?;
    info!(
        readings_table = %cfg.supabase.readings_table,
        poller = cfg.poller.enabled,
        controls = cfg.dashboard.controls_enabled,
        "Configuration loaded from {}",
        cfg_path
    );

    let client = Arc::new(SupabaseClient::new(&cfg.supabase)?);
    let source: Arc<dyn ReadingSource> = client.clone();
    let sink: Option<Arc<dyn CommandSink>> = if cfg.dashboard.controls_enabled {
        Some(client as Arc<dyn CommandSink>)
    } else {
        None
    };
    let service = DashboardService::new(source, sink, DashboardSettings::from(&cfg));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller_handle = if cfg.poller.enabled {
        Some(tokio::spawn(poller::run(
            service.clone(),
            cfg.poller.interval(),
            shutdown_rx,
        )))
    } else {
        info!("Poller disabled, fetching on each page load");
        None
    };

    let router = api::create_router(service);
    let addr = format!("{}:{}", cfg.api.host, cfg.api.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", addr, e))?;

    info!("Dashboard listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "Server error");
    }

    let _ = shutdown_tx.send(true);
    if let Some(handle) = poller_handle {
        if let Err(e) = handle.await {
            error!(error = %e, "Poller task failed");
        }
    }

    info!("Application shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down gracefully"),
        _ = terminate => info!("Received SIGTERM, shutting down gracefully"),
    }
}
