#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use canvas_sync::canvas::{CanvasClient, Query};
use canvas_sync::config::CanvasConfig;
use canvas_sync::error::AppError;
use chrono::{TimeZone, Utc};
use serde_json::{Value, json};

/// Canned Canvas responses keyed by path, with a log of every request made.
#[derive(Default)]
pub struct StubCanvas {
    responses: Mutex<HashMap<String, Result<Vec<Value>, u16>>>,
    requests: Mutex<Vec<(String, Query)>>,
}

impl StubCanvas {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, path: &str, body: Value) {
        let records = match body {
            Value::Array(items) => items,
            other => vec![other],
        };
        self.responses.lock().unwrap().insert(path.to_string(), Ok(records));
    }

    pub fn fail(&self, path: &str, status: u16) {
        self.responses.lock().unwrap().insert(path.to_string(), Err(status));
    }

    pub fn requests(&self) -> Vec<(String, Query)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.requests().iter().filter(|(p, _)| p == path).count()
    }

    pub fn last_query(&self, path: &str) -> Option<Query> {
        self.requests()
            .into_iter()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, query)| query)
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }
}

#[async_trait]
impl CanvasClient for StubCanvas {
    async fn fetch(&self, path: &str, query: &[(String, String)]) -> Result<Vec<Value>, AppError> {
        self.requests
            .lock()
            .unwrap()
            .push((path.to_string(), query.to_vec()));

        match self.responses.lock().unwrap().get(path) {
            Some(Ok(records)) => Ok(records.clone()),
            Some(Err(status)) => Err(AppError::Api {
                status: *status,
                body: "stubbed failure".to_string(),
            }),
            None => Err(AppError::Api {
                status: 404,
                body: format!("no stub for {}", path),
            }),
        }
    }
}

pub fn config() -> CanvasConfig {
    CanvasConfig::new("test-token", Utc.with_ymd_and_hms(2020, 7, 1, 0, 0, 0).unwrap())
}

pub fn course(id: u64, code: &str, start_at: &str) -> Value {
    json!({
        "id": id,
        "name": format!("{} course", code),
        "course_code": code,
        "start_at": start_at,
        "term": { "name": "Fall 2020", "start_at": "2020-09-01T00:00:00Z", "end_at": "2020-12-31T00:00:00Z" },
        "teachers": [{ "id": 1, "display_name": "Prof" }],
        "tabs": [{ "id": "home", "label": "Home", "position": 1 }]
    })
}

pub fn permissions(announcements: bool, grades: bool) -> Value {
    json!({
        "read_announcements": announcements,
        "read_grades": grades,
        "manage_grades": false
    })
}

pub fn announcement(id: u64, course_id: u64, position: i64, read: bool) -> Value {
    json!({
        "id": id,
        "title": format!("announcement {}", id),
        "message": "<p>hello</p>",
        "posted_at": "2020-09-15T12:00:00Z",
        "position": position,
        "read_state": if read { "read" } else { "unread" },
        "author": { "id": 1, "display_name": "Prof", "html_url": "https://q/users/1" },
        "url": format!("https://q/courses/{}/discussion_topics/{}", course_id, id),
        "context_code": format!("course_{}", course_id)
    })
}

pub fn assignment(id: u64, position: i64, score: Option<f64>) -> Value {
    json!({
        "id": id,
        "name": format!("assignment {}", id),
        "position": position,
        "due_at": "2020-10-01T23:59:00Z",
        "points_possible": 10.0,
        "omit_from_final_grade": false,
        "allowed_attempts": -1,
        "has_submitted_submissions": score.is_some(),
        "html_url": format!("https://q/assignments/{}", id),
        "submission": {
            "id": id * 100,
            "score": score,
            "grade": score.map(|s| s.to_string()),
            "workflow_state": if score.is_some() { "graded" } else { "unsubmitted" },
            "late": false,
            "missing": false
        }
    })
}
