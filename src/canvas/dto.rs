use serde::Deserialize;

/// Entry of `GET /api/v1/courses`. Access-restricted courses only carry `id`,
/// so everything else is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct CoursePayload {
    pub id: u64,
    pub name: Option<String>,
    pub course_code: Option<String>,
    pub start_at: Option<String>,
    pub end_at: Option<String>,
    pub calendar: Option<CalendarPayload>,
    pub term: Option<TermPayload>,
    pub image_download_url: Option<String>,
    pub total_students: Option<u32>,
    #[serde(default)]
    pub teachers: Vec<TeacherPayload>,
    #[serde(default)]
    pub tabs: Vec<TabPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarPayload {
    pub ics: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TermPayload {
    pub name: Option<String>,
    pub start_at: Option<String>,
    pub end_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeacherPayload {
    pub id: Option<u64>,
    pub display_name: Option<String>,
    pub avatar_image_url: Option<String>,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TabPayload {
    pub id: String,
    pub label: Option<String>,
    pub html_url: Option<String>,
    pub position: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnnouncementPayload {
    pub id: u64,
    pub title: Option<String>,
    pub message: Option<String>,
    pub posted_at: Option<String>,
    pub position: Option<i64>,
    pub read_state: Option<String>,
    pub author: Option<AuthorPayload>,
    pub url: Option<String>,
    pub html_url: Option<String>,
    pub context_code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorPayload {
    pub id: Option<u64>,
    pub display_name: Option<String>,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentPayload {
    pub id: u64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub position: Option<i64>,
    pub due_at: Option<String>,
    pub unlock_at: Option<String>,
    pub omit_from_final_grade: Option<bool>,
    pub allowed_attempts: Option<i64>,
    pub has_submitted_submissions: Option<bool>,
    pub html_url: Option<String>,
    pub points_possible: Option<f64>,
    pub submission: Option<SubmissionPayload>,
    pub submissions_download_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionPayload {
    pub id: Option<u64>,
    pub grade: Option<String>,
    pub score: Option<f64>,
    pub submitted_at: Option<String>,
    pub workflow_state: Option<String>,
    pub graded_at: Option<String>,
    pub late: Option<bool>,
    pub missing: Option<bool>,
    pub attachments: Option<Vec<AttachmentPayload>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentPayload {
    pub id: u64,
    pub display_name: Option<String>,
    pub filename: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "content-type")]
    pub content_type: Option<String>,
    pub size: Option<u64>,
}
