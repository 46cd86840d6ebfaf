//! Expired Story Cleaner Background Job
//!
//! Stories are only served inside the story window, but the rows stay
//! around. This job soft-deletes everything older than the window so the
//! partial index on live stories stays small.

use crate::db::ContentStore;
use crate::error::Result;
use crate::metrics::stories as metrics;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use story_engine::PlaybackSettings;
use tokio::time::sleep;

pub struct StoryCleaner {
    store: Arc<dyn ContentStore>,
    settings: PlaybackSettings,
    interval: Duration,
}

impl StoryCleaner {
    pub fn new(store: Arc<dyn ContentStore>, settings: PlaybackSettings, interval: Duration) -> Self {
        Self {
            store,
            settings,
            interval,
        }
    }

    pub async fn run(self) {
        tracing::info!(
            "Starting story cleaner background job (check_interval={}s, window_hours={})",
            self.interval.as_secs(),
            self.settings.story_window.num_hours()
        );

        loop {
            sleep(self.interval).await;

            let cycle_start = Instant::now();
            match self.run_once().await {
                Ok(deleted) => {
                    metrics::record_cleanup_run("success", cycle_start.elapsed());
                    if deleted > 0 {
                        tracing::info!(
                            deleted,
                            duration_ms = cycle_start.elapsed().as_millis() as u64,
                            "Expired stories soft-deleted"
                        );
                    }
                }
                Err(e) => {
                    metrics::record_cleanup_run("error", cycle_start.elapsed());
                    tracing::error!(error = %e, "Story cleanup failed");
                }
            }
        }
    }

    /// One cleanup pass. Returns the number of stories removed.
    pub async fn run_once(&self) -> Result<u64> {
        let cutoff = self.settings.window_start(Utc::now());
        let deleted = self.store.cleanup_expired(cutoff).await?;
        metrics::record_cleanup_deleted(deleted);
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockContentStore;
    use crate::error::AppError;
    use chrono::Duration as ChronoDuration;

    #[tokio::test]
    async fn cleans_everything_older_than_window() {
        let mut mock = MockContentStore::new();
        mock.expect_cleanup_expired()
            .times(1)
            .withf(|before| {
                let age = Utc::now() - *before;
                age >= ChronoDuration::hours(24) && age < ChronoDuration::hours(25)
            })
            .returning(|_| Ok(3));

        let cleaner = StoryCleaner::new(
            Arc::new(mock),
            PlaybackSettings::default(),
            Duration::from_secs(600),
        );
        assert_eq!(cleaner.run_once().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn store_errors_propagate() {
        let mut mock = MockContentStore::new();
        mock.expect_cleanup_expired()
            .returning(|_| Err(AppError::DatabaseError("timeout".into())));

        let cleaner = StoryCleaner::new(
            Arc::new(mock),
            PlaybackSettings::default(),
            Duration::from_secs(600),
        );
        assert!(cleaner.run_once().await.is_err());
    }
}
