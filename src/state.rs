use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::canvas::CanvasClient;
use crate::config::CanvasConfig;
use crate::error::AppError;
use crate::models::{CourseId, PublicCourseSnapshot};
use crate::services::{CourseScope, EngineSnapshot, RedactionView, SyncEngine, SyncStats};

/// What the read routes serve. Replaced at the end of every cycle, so readers
/// never wait on a sync that is still talking to Canvas.
#[derive(Debug, Clone)]
pub struct Published {
    pub engine: EngineSnapshot,
    pub lectures: Vec<PublicCourseSnapshot>,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Mutex<SyncEngine>>,
    pub lectures: Arc<Mutex<RedactionView>>,
    pub published: Arc<RwLock<Published>>,
}

impl AppState {
    pub fn new(config: CanvasConfig, canvas: Arc<dyn CanvasClient>) -> Self {
        let engine = SyncEngine::new(config.clone(), canvas.clone());
        let published = Published {
            engine: engine.snapshot(),
            lectures: Vec::new(),
        };
        Self {
            engine: Arc::new(Mutex::new(engine)),
            lectures: Arc::new(Mutex::new(RedactionView::new(config, canvas))),
            published: Arc::new(RwLock::new(published)),
        }
    }

    /// One engine cycle. The registry is republished even when the cycle
    /// fails, since discovery may already have changed it.
    pub async fn sync_courses(&self, scope: Option<CourseScope>) -> Result<SyncStats, AppError> {
        let mut engine = self.engine.lock().await;
        let result = match scope {
            Some(scope) => engine.update_with(scope).await,
            None => engine.update().await,
        };
        self.published.write().await.engine = engine.snapshot();
        result
    }

    pub async fn sync_course_extras(&self, ids: &[CourseId]) -> Result<SyncStats, AppError> {
        let mut engine = self.engine.lock().await;
        let result = engine.get_course_extras(ids).await;
        self.published.write().await.engine = engine.snapshot();
        result
    }

    pub async fn sync_lectures(&self) -> Result<SyncStats, AppError> {
        let mut view = self.lectures.lock().await;
        let result = view.update().await;
        self.published.write().await.lectures = view.courses();
        result
    }
}
