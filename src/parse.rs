//! Small value parsers shared by the payload translation code.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::models::CourseId;

/// Subject letters and number, followed by a term marker letter and a 1-9 digit,
/// e.g. `CHM136H1` -> `CHM136`.
static SHORT_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z]+[0-9]+)[A-Z][1-9]").expect("short code pattern"));

const LECTURE_MARKER: &str = "LEC";
const COURSE_CONTEXT_PREFIX: &str = "course_";

/// Parse RFC3339 timestamp to comparable format
pub fn parse_timestamp(ts: Option<&str>) -> Option<DateTime<Utc>> {
    ts.and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn short_code(raw_code: &str) -> Option<String> {
    SHORT_CODE
        .captures(raw_code)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn is_lecture(name: Option<&str>, raw_code: &str) -> bool {
    raw_code.contains(LECTURE_MARKER) || name.is_some_and(|name| name.contains(LECTURE_MARKER))
}

pub fn context_code(course_id: CourseId) -> String {
    format!("{}{}", COURSE_CONTEXT_PREFIX, course_id)
}

/// `course_1234` -> `1234`. Other context kinds (groups, users) yield `None`.
pub fn course_id_from_context_code(context_code: &str) -> Option<CourseId> {
    context_code
        .strip_prefix(COURSE_CONTEXT_PREFIX)
        .and_then(|id| id.parse().ok())
}

/// Canvas reports unlimited attempts as `-1`.
pub fn allowed_attempts(raw: Option<i64>) -> Option<u32> {
    raw.filter(|attempts| *attempts >= 0)
        .and_then(|attempts| u32::try_from(attempts).ok())
}
