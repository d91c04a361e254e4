pub mod dto;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{HeaderMap, LINK};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::CanvasConfig;
use crate::error::AppError;
use crate::models::CourseId;
use crate::parse::context_code;

pub const COURSES_PATH: &str = "/api/v1/courses";
pub const ANNOUNCEMENTS_PATH: &str = "/api/v1/announcements";

const PAGE_SIZE: &str = "100";

/// Query parameters in request order. Keys may repeat (`include[]`, `context_codes[]`).
pub type Query = Vec<(String, String)>;

/// The one primitive the sync engine needs from Canvas: a GET that returns every
/// record of a (possibly paginated) collection. Object bodies come back as a
/// single record.
#[async_trait]
pub trait CanvasClient: Send + Sync {
    async fn fetch(&self, path: &str, query: &[(String, String)]) -> Result<Vec<Value>, AppError>;
}

pub struct CanvasHttpClient {
    client: Client,
    base_url: String,
    api_token: String,
}

impl CanvasHttpClient {
    pub fn new(config: &CanvasConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.base_url(),
            api_token: config.api_token.clone(),
        })
    }

    async fn get_page(&self, url: Url) -> Result<(Vec<Value>, Option<Url>), AppError> {
        let response = self.client
            .get(url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Api { status: status.as_u16(), body });
        }

        let next = next_page(response.headers());
        let records = match response.json::<Value>().await? {
            Value::Array(items) => items,
            other => vec![other],
        };

        Ok((records, next))
    }
}

#[async_trait]
impl CanvasClient for CanvasHttpClient {
    async fn fetch(&self, path: &str, query: &[(String, String)]) -> Result<Vec<Value>, AppError> {
        let mut params = query.to_vec();
        params.push(("per_page".to_string(), PAGE_SIZE.to_string()));

        let url = Url::parse_with_params(&format!("{}{}", self.base_url, path), &params)
            .map_err(|e| AppError::Config(format!("Invalid Canvas url for {}: {}", path, e)))?;

        let mut records = Vec::new();
        let mut next = Some(url);
        while let Some(url) = next.take() {
            let (page, following) = self.get_page(url).await?;
            records.extend(page);
            next = following;
        }

        tracing::debug!("Fetched {} records from {}", records.len(), path);
        Ok(records)
    }
}

pub struct NoopCanvasClient;

#[async_trait]
impl CanvasClient for NoopCanvasClient {
    async fn fetch(&self, _path: &str, _query: &[(String, String)]) -> Result<Vec<Value>, AppError> {
        Ok(Vec::new())
    }
}

fn next_page(headers: &HeaderMap) -> Option<Url> {
    headers
        .get(LINK)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_next_link)
        .and_then(|link| Url::parse(&link).ok())
}

/// Extracts the `rel="next"` target from an RFC 5988 `Link` header.
pub fn parse_next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut segments = part.split(';');
        let target = segments.next()?.trim();
        if !segments.any(|segment| segment.trim() == r#"rel="next""#) {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}

/// Deserializes each record on its own so one malformed entry only costs itself.
pub fn decode_records<T: DeserializeOwned>(kind: &str, records: Vec<Value>) -> Vec<T> {
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value(record) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Failed to parse {} payload: {}", kind, e);
                None
            }
        })
        .collect()
}

pub fn permissions_path(course_id: CourseId) -> String {
    format!("{}/{}/permissions", COURSES_PATH, course_id)
}

pub fn assignments_path(course_id: CourseId) -> String {
    format!("{}/{}/assignments", COURSES_PATH, course_id)
}

pub fn course_listing_query(active_only: bool) -> Query {
    let mut query: Query = ["term", "course_image", "total_students", "teachers", "tabs"]
        .into_iter()
        .map(|include| ("include[]".to_string(), include.to_string()))
        .collect();
    if active_only {
        query.push(("enrollment_state".to_string(), "active".to_string()));
    }
    query
}

pub fn announcements_query(
    course_ids: &[CourseId],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Query {
    let mut query: Query = course_ids
        .iter()
        .map(|id| ("context_codes[]".to_string(), context_code(*id)))
        .collect();
    query.push(("start_date".to_string(), start.to_rfc3339_opts(SecondsFormat::Secs, true)));
    query.push(("end_date".to_string(), end.to_rfc3339_opts(SecondsFormat::Secs, true)));
    query
}

pub fn assignments_query() -> Query {
    vec![
        ("include[]".to_string(), "submission".to_string()),
        ("include[]".to_string(), "score_statistics".to_string()),
    ]
}
