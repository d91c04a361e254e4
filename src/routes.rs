use axum::Json;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Router, http::StatusCode};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::{CourseId, CourseSnapshot, PublicCourseSnapshot};
use crate::registry::CourseFilter;
use crate::services::{CourseScope, EngineSnapshot, SyncStats};
use crate::state::AppState;

#[derive(Deserialize)]
struct SyncQueryParams {
    scope: Option<CourseScope>,
}

#[derive(Deserialize)]
struct ExtrasRequest {
    course_ids: Vec<CourseId>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/snapshot", get(snapshot))
        .route("/courses", get(list_courses))
        .route("/courses/{id}", get(get_course))
        .route("/lectures", get(list_lectures))
        .route("/sync", post(sync_now))
        .route("/sync/extras", post(sync_extras))
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn snapshot(State(state): State<AppState>) -> Json<EngineSnapshot> {
    Json(state.published.read().await.engine.clone())
}

async fn list_courses(
    State(state): State<AppState>,
    Query(filter): Query<CourseFilter>,
) -> Json<Vec<CourseSnapshot>> {
    let published = state.published.read().await;
    let courses = published
        .engine
        .courses
        .iter()
        .filter(|course| filter.matches(course.active, course.code.as_deref()))
        .cloned()
        .collect();
    Json(courses)
}

async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<CourseId>,
) -> Result<Json<CourseSnapshot>, AppError> {
    let published = state.published.read().await;
    let course = published
        .engine
        .courses
        .iter()
        .find(|course| course.id == id)
        .ok_or(AppError::NotFound)?;
    Ok(Json(course.clone()))
}

async fn list_lectures(State(state): State<AppState>) -> Json<Vec<PublicCourseSnapshot>> {
    Json(state.published.read().await.lectures.clone())
}

async fn sync_now(
    State(state): State<AppState>,
    Query(params): Query<SyncQueryParams>,
) -> Result<Json<SyncStats>, AppError> {
    let stats = state.sync_courses(params.scope).await?;
    Ok(Json(stats))
}

async fn sync_extras(
    State(state): State<AppState>,
    Json(req): Json<ExtrasRequest>,
) -> Result<Json<SyncStats>, AppError> {
    if req.course_ids.is_empty() {
        return Err(AppError::BadRequest("course_ids must not be empty".to_string()));
    }
    let stats = state.sync_course_extras(&req.course_ids).await?;
    Ok(Json(stats))
}
