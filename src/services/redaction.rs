use std::sync::Arc;

use tracing::info;

use crate::canvas::CanvasClient;
use crate::config::CanvasConfig;
use crate::error::AppError;
use crate::models::{CourseId, PublicCourseSnapshot};
use crate::registry::CourseRegistry;
use crate::services::sync_engine::{CourseScope, SyncEngine, SyncStats};

/// Lecture courses from the active listing, with read state and grading data
/// removed. Safe to hand to consumers who must not see a student's progress.
pub struct RedactionView {
    engine: SyncEngine,
    lecture_ids: Vec<CourseId>,
}

impl RedactionView {
    pub fn new(config: CanvasConfig, canvas: Arc<dyn CanvasClient>) -> Self {
        Self {
            engine: SyncEngine::new(config, canvas),
            lecture_ids: Vec::new(),
        }
    }

    /// Re-runs active discovery, recomputes the lecture subset from that listing
    /// alone and fetches extras for the subset. A course missing from the listing
    /// drops out of the view.
    pub async fn update(&mut self) -> Result<SyncStats, AppError> {
        info!("Refreshing lecture view");
        let discovered = self.engine.discover(CourseScope::Active).await?;

        let registry = self.engine.registry();
        self.lecture_ids = discovered
            .listed
            .iter()
            .copied()
            .filter(|id| registry.get(*id).is_some_and(|course| course.is_lecture))
            .collect();

        let lecture_ids = self.lecture_ids.clone();
        let mut stats = self.engine.get_course_extras(&lecture_ids).await?;
        stats.courses = discovered.added;

        info!("Lecture view holds {} courses", self.lecture_ids.len());
        Ok(stats)
    }

    pub fn lecture_ids(&self) -> &[CourseId] {
        &self.lecture_ids
    }

    pub fn registry(&self) -> &CourseRegistry {
        self.engine.registry()
    }

    pub fn courses(&self) -> Vec<PublicCourseSnapshot> {
        self.lecture_ids
            .iter()
            .filter_map(|id| self.course(*id))
            .collect()
    }

    pub fn course(&self, id: CourseId) -> Option<PublicCourseSnapshot> {
        if !self.lecture_ids.contains(&id) {
            return None;
        }
        self.engine
            .registry()
            .get(id)
            .map(|course| course.to_snapshot().redact())
    }
}
