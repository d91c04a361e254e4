use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::canvas::dto::{AnnouncementPayload, AssignmentPayload, CoursePayload};
use crate::canvas::{
    ANNOUNCEMENTS_PATH, COURSES_PATH, CanvasClient, announcements_query, assignments_path,
    assignments_query, course_listing_query, decode_records, permissions_path,
};
use crate::config::CanvasConfig;
use crate::error::AppError;
use crate::models::{
    Announcement, Assignment, CourseId, CourseSnapshot, Permissions, READ_ANNOUNCEMENTS,
    READ_GRADES,
};
use crate::parse::course_id_from_context_code;
use crate::registry::{CourseRegistry, ListingContext, Reconciled};
use crate::sync::TaskGroup;

/// Which course listing discovery asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseScope {
    /// `enrollment_state=active`; every listed course is active.
    Active,
    All,
}

/// Counts of newly seen records in one cycle, plus the courses whose
/// permission or assignment request failed.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStats {
    pub courses: usize,
    pub announcements: usize,
    pub assignments: usize,
    pub failed_courses: Vec<CourseId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LastUpdate {
    pub at: DateTime<Utc>,
    pub stats: SyncStats,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    pub subdomain: String,
    pub year_start_date: DateTime<Utc>,
    pub last_update: Option<LastUpdate>,
    pub courses: Vec<CourseSnapshot>,
}

/// Drives refresh cycles against Canvas and owns the resulting course registry.
///
/// A cycle is discovery, then permissions, announcements and assignments for
/// the discovered courses. Discovery and announcement failures abort the cycle;
/// permission and assignment failures only cost the course they belong to.
pub struct SyncEngine {
    config: CanvasConfig,
    canvas: Arc<dyn CanvasClient>,
    registry: CourseRegistry,
    last_update: Option<LastUpdate>,
}

impl SyncEngine {
    pub fn new(config: CanvasConfig, canvas: Arc<dyn CanvasClient>) -> Self {
        Self {
            config,
            canvas,
            registry: CourseRegistry::new(),
            last_update: None,
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn registry(&self) -> &CourseRegistry {
        &self.registry
    }

    pub fn last_update(&self) -> Option<&LastUpdate> {
        self.last_update.as_ref()
    }

    /// Sticks to the active listing once every known course is active.
    pub fn default_scope(&self) -> CourseScope {
        if self.registry.all_active() {
            CourseScope::Active
        } else {
            CourseScope::All
        }
    }

    pub async fn update(&mut self) -> Result<SyncStats, AppError> {
        let scope = self.default_scope();
        self.update_with(scope).await
    }

    pub async fn update_with(&mut self, scope: CourseScope) -> Result<SyncStats, AppError> {
        info!("Starting sync ({:?} courses)...", scope);

        info!("Step 1: Discovering courses");
        let discovered = self.discover(scope).await?;

        let mut stats = self.sync_extras(&discovered.listed, true).await?;
        stats.courses = discovered.added;

        info!("Sync completed: {:?}", stats);
        self.last_update = Some(LastUpdate {
            at: Utc::now(),
            stats: stats.clone(),
        });
        Ok(stats)
    }

    /// Permissions, announcements and assignments for `ids` only, without a
    /// discovery pass. Ids the registry does not know are ignored.
    pub async fn get_course_extras(&mut self, ids: &[CourseId]) -> Result<SyncStats, AppError> {
        self.sync_extras(ids, false).await
    }

    /// Fetches a course listing and reconciles it into the registry.
    pub async fn discover(&mut self, scope: CourseScope) -> Result<Reconciled, AppError> {
        let active_only = scope == CourseScope::Active;
        let records = self
            .canvas
            .fetch(COURSES_PATH, &course_listing_query(active_only))
            .await?;
        let listing: Vec<CoursePayload> = decode_records("course", records);

        let context = ListingContext {
            year_start: self.config.year_start,
            now: Utc::now(),
            active_only,
        };
        let outcome = self.registry.reconcile(listing, &context);
        info!(
            "Discovered {} courses ({} new, {} skipped)",
            outcome.listed.len(),
            outcome.added,
            outcome.skipped
        );
        Ok(outcome)
    }

    /// Returns the given courses to the "permissions unknown" state.
    pub fn invalidate_permissions(&mut self, ids: &[CourseId]) {
        for id in ids {
            if let Some(course) = self.registry.get_mut(*id) {
                course.invalidate_permissions();
            }
        }
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            subdomain: self.config.subdomain.clone(),
            year_start_date: self.config.year_start,
            last_update: self.last_update.clone(),
            courses: self.registry.snapshots(),
        }
    }

    async fn sync_extras(
        &mut self,
        ids: &[CourseId],
        require_active: bool,
    ) -> Result<SyncStats, AppError> {
        let mut seen = HashSet::new();
        let targets: Vec<CourseId> = ids
            .iter()
            .copied()
            .filter(|id| self.registry.contains(*id) && seen.insert(*id))
            .collect();

        let mut stats = SyncStats::default();

        info!("Step 2: Fetching permissions");
        let failed_permissions = self.sync_permissions(&targets).await;

        info!("Step 3: Fetching announcements");
        stats.announcements = self.sync_announcements(&targets).await?;

        info!("Step 4: Fetching assignments");
        let (assignments, failed_assignments) =
            self.sync_assignments(&targets, require_active).await;
        stats.assignments = assignments;

        stats.failed_courses = failed_permissions
            .into_iter()
            .chain(failed_assignments)
            .collect();
        stats.failed_courses.sort_unstable();
        stats.failed_courses.dedup();

        info!(
            "Fetched {} new announcements, {} new assignments ({} courses failed)",
            stats.announcements,
            stats.assignments,
            stats.failed_courses.len()
        );
        Ok(stats)
    }

    /// Fetches permissions for every target whose permissions are still unknown.
    /// Returns the ids whose request failed; those stay unknown.
    async fn sync_permissions(&mut self, targets: &[CourseId]) -> Vec<CourseId> {
        let pending: Vec<CourseId> = targets
            .iter()
            .copied()
            .filter(|id| {
                self.registry
                    .get(*id)
                    .is_some_and(|course| !course.permissions_known())
            })
            .collect();
        if pending.is_empty() {
            debug!("All target permissions already known");
            return Vec::new();
        }

        let canvas = Arc::clone(&self.canvas);
        let group: TaskGroup<_, _> = pending
            .iter()
            .map(|&id| (id, fetch_permissions(canvas.as_ref(), id)))
            .collect();
        let settled = group.settle().await;

        for (id, permissions) in settled.succeeded {
            if let Some(course) = self.registry.get_mut(id) {
                course.update_permissions(permissions);
            }
        }

        settled
            .failed
            .into_iter()
            .map(|(id, e)| {
                warn!("Failed to fetch permissions for course {}: {}", id, e);
                id
            })
            .collect()
    }

    /// One batched request for every target allowed to read announcements.
    async fn sync_announcements(&mut self, targets: &[CourseId]) -> Result<usize, AppError> {
        let permitted: Vec<CourseId> = targets
            .iter()
            .copied()
            .filter(|id| {
                self.registry
                    .get(*id)
                    .is_some_and(|course| course.has_permission(READ_ANNOUNCEMENTS))
            })
            .collect();
        if permitted.is_empty() {
            debug!("No course grants {}", READ_ANNOUNCEMENTS);
            return Ok(0);
        }

        let now = Utc::now();
        let start = targets
            .iter()
            .filter_map(|id| self.registry.get(*id).and_then(|course| course.start_date))
            .min()
            .unwrap_or(self.config.year_start)
            .min(now);

        let records = self
            .canvas
            .fetch(ANNOUNCEMENTS_PATH, &announcements_query(&permitted, start, now))
            .await?;

        // Only the courses the request was scoped to may receive announcements.
        let requested: HashSet<CourseId> = permitted.iter().copied().collect();
        let mut added = 0;
        for payload in decode_records::<AnnouncementPayload>("announcement", records) {
            let owner = match course_id_from_context_code(&payload.context_code) {
                Some(id) if requested.contains(&id) => self.registry.get_mut(id),
                _ => None,
            };
            let Some(course) = owner else {
                debug!(
                    "Dropping announcement {} for unknown context {}",
                    payload.id, payload.context_code
                );
                continue;
            };
            if course.add_announcement(Announcement::from(payload)) {
                added += 1;
            }
        }

        for id in &permitted {
            if let Some(course) = self.registry.get_mut(*id) {
                course.mark_announcements_synced(now);
            }
        }

        Ok(added)
    }

    /// One request per target allowed to read grades (and active, when
    /// `require_active`), all in flight together.
    async fn sync_assignments(
        &mut self,
        targets: &[CourseId],
        require_active: bool,
    ) -> (usize, Vec<CourseId>) {
        let eligible: Vec<CourseId> = targets
            .iter()
            .copied()
            .filter(|id| {
                self.registry.get(*id).is_some_and(|course| {
                    course.has_permission(READ_GRADES) && (!require_active || course.active)
                })
            })
            .collect();

        let canvas = Arc::clone(&self.canvas);
        let group: TaskGroup<_, _> = eligible
            .iter()
            .map(|&id| (id, fetch_assignments(canvas.as_ref(), id)))
            .collect();
        let settled = group.settle().await;

        let now = Utc::now();
        let mut added = 0;
        for (id, assignments) in settled.succeeded {
            let Some(course) = self.registry.get_mut(id) else {
                continue;
            };
            for assignment in assignments {
                if course.add_assignment(assignment) {
                    added += 1;
                }
            }
            course.mark_assignments_synced(now);
        }

        let failed = settled
            .failed
            .into_iter()
            .map(|(id, e)| {
                warn!("Failed to fetch assignments for course {}: {}", id, e);
                id
            })
            .collect();

        (added, failed)
    }
}

async fn fetch_permissions(canvas: &dyn CanvasClient, id: CourseId) -> Result<Permissions, AppError> {
    let records = canvas.fetch(&permissions_path(id), &[]).await?;
    let permissions = match records.into_iter().next() {
        Some(Value::Object(map)) => map
            .into_iter()
            .filter_map(|(name, granted)| granted.as_bool().map(|granted| (name, granted)))
            .collect(),
        Some(other) => {
            return Err(AppError::UnexpectedPayload(format!(
                "permissions for course {}: {}",
                id, other
            )));
        }
        None => Permissions::new(),
    };
    Ok(permissions)
}

async fn fetch_assignments(canvas: &dyn CanvasClient, id: CourseId) -> Result<Vec<Assignment>, AppError> {
    let records = canvas
        .fetch(&assignments_path(id), &assignments_query())
        .await?;
    Ok(decode_records::<AssignmentPayload>("assignment", records)
        .into_iter()
        .map(Assignment::from)
        .collect())
}
