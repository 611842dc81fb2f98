// Periodic removal of expired download grants

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tokio::task::JoinHandle;

use crate::documents::FileDownloadRepository;

/// Spawn a task deleting expired download grants every `every`
pub fn spawn_expired_download_cleanup(pool: PgPool, every: Duration) -> JoinHandle<()> {
    let downloads = FileDownloadRepository::new(pool);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            match downloads.delete_expired(Utc::now()).await {
                Ok(0) => tracing::debug!("No expired download grants"),
                Ok(removed) => tracing::info!("Removed {} expired download grants", removed),
                Err(e) => tracing::error!("Expired download cleanup failed: {}", e),
            }
        }
    })
}
