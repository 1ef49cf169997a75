use std::time::Duration;

use log::{error, info};
use tokio::time;

use crate::app::App;
use crate::models::tuit::Stats;

/// Periodically brings every tuit's like and dislike counters back in line with the
/// records behind them.
pub async fn reconcile_counters_task(app: App) {
    let interval_secs = app.config.counters.reconcile_interval_secs;
    if interval_secs == 0 {
        info!("Counter reconciliation disabled");
        return;
    }

    let mut reconcile_interval = time::interval(Duration::from_secs(interval_secs));

    tokio::spawn(async move {
        loop {
            reconcile_interval.tick().await;

            match Stats::reconcile_all(&app.store).await {
                Ok(drifts) if drifts.is_empty() => info!("Counter reconciliation ran, no drift"),
                Ok(drifts) => info!("Counter reconciliation repaired {} counters", drifts.len()),
                Err(e) => error!("Counter reconciliation failed: {}", e),
            }
        }
    });
}
