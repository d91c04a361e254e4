use std::sync::Arc;

use canvas_sync::canvas::CanvasHttpClient;
use canvas_sync::config::CanvasConfig;
use canvas_sync::registry::CourseFilter;
use canvas_sync::services::{RedactionView, SyncEngine};

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored --test-threads=1
async fn test_full_update_against_canvas() {
    dotenvy::dotenv().ok();

    let config = CanvasConfig::new_from_env().expect("Failed to load Canvas config");
    let canvas = Arc::new(CanvasHttpClient::new(&config).expect("Failed to create Canvas client"));
    let mut engine = SyncEngine::new(config, canvas);

    let stats = engine.update().await.expect("Failed to sync");
    println!("Sync stats: {:?}", stats);
    assert!(!engine.registry().is_empty(), "No courses found in Canvas");

    let filter = CourseFilter { active: true, code: std::env::var("CANVAS_TEST_CODE").ok() };
    if let Some(course) = engine.registry().filter(&filter).first() {
        println!("{} ({:?})", course.name, course.code);
        for announcement in course.announcements() {
            println!("  [{}] {}", announcement.position, announcement.title);
        }
    }

    let again = engine.update().await.expect("Failed to sync twice");
    assert_eq!(again.courses, 0, "A second sync must not rediscover courses");
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored --test-threads=1
async fn test_lecture_view_against_canvas() {
    dotenvy::dotenv().ok();

    let config = CanvasConfig::new_from_env().expect("Failed to load Canvas config");
    let canvas = Arc::new(CanvasHttpClient::new(&config).expect("Failed to create Canvas client"));
    let mut view = RedactionView::new(config, canvas);

    view.update().await.expect("Failed to refresh lecture view");
    for course in view.courses() {
        assert!(course.is_lecture);
        println!("{} - {} announcements", course.name, course.announcements.len());
    }
}
