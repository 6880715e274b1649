use crate::services::{DashboardService, SnapshotStatus};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{info, warn};

/// Refresh the dashboard snapshot on a fixed interval until shutdown.
pub async fn run(service: DashboardService, interval: Duration, mut shutdown: watch::Receiver<bool>) {
    info!(interval_secs = interval.as_secs(), "Poller started");

    loop {
        let snapshot = service.refresh().await;
        if let SnapshotStatus::Error {
            retry_in_secs: Some(secs),
            ..
        } = snapshot.status
        {
            warn!("Will attempt to reconnect in {} seconds", secs);
        }

        // A dropped sender also counts as shutdown
        tokio::select! {
            _ = sleep(interval) => {}
            _ = shutdown.wait_for(|stop| *stop) => break,
        }
    }

    info!("Poller stopped");
}
