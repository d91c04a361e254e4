use std::time::Duration;

use tracing::{info, warn};

use crate::error::AppError;
use crate::services::sync_engine::SyncStats;
use crate::state::AppState;

/// Periodically refreshes the private engine and the lecture view.
pub struct SyncScheduler {
    state: AppState,
    interval: Duration,
}

impl SyncScheduler {
    pub fn new(state: AppState, interval_secs: u64) -> Self {
        Self {
            state,
            interval: Duration::from_secs(interval_secs),
        }
    }

    /// Runs forever. A failed cycle is logged and the next one runs on schedule.
    pub async fn start(self) {
        info!("Starting auto-sync scheduler (interval: {:?})", self.interval);

        loop {
            tokio::time::sleep(self.interval).await;
            self.tick().await;
        }
    }

    /// One cycle of both views, each outcome logged on its own.
    pub async fn tick(&self) {
        let (courses, lectures) = self.run_sync().await;

        match courses {
            Ok(stats) => info!(
                "Auto-sync completed - {} courses, {} announcements, {} assignments new",
                stats.courses, stats.announcements, stats.assignments
            ),
            Err(e) => warn!("Auto-sync failed: {:?}", e),
        }
        match lectures {
            Ok(stats) => info!(
                "Lecture sync completed - {} announcements, {} assignments new",
                stats.announcements, stats.assignments
            ),
            Err(e) => warn!("Lecture sync failed: {:?}", e),
        }
    }

    /// The engine and the lecture view keep separate registries, so the lecture
    /// view is refreshed even when the engine cycle fails.
    pub async fn run_sync(
        &self,
    ) -> (Result<SyncStats, AppError>, Result<SyncStats, AppError>) {
        let courses = self.state.sync_courses(None).await;
        let lectures = self.state.sync_lectures().await;
        (courses, lectures)
    }
}
