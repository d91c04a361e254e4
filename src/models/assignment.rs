use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::canvas::dto::{AssignmentPayload, AttachmentPayload, SubmissionPayload};
use crate::models::record_store::Record;
use crate::parse::{allowed_attempts, parse_timestamp};

pub type AssignmentId = u64;

/// Score reported for a submission that has not been graded.
pub const UNGRADED_SCORE: f64 = -1.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: AssignmentId,
    pub name: String,
    pub description: Option<String>,
    pub position: i64,
    pub due_date: Option<DateTime<Utc>>,
    pub unlock_date: Option<DateTime<Utc>>,
    /// Counts toward the final grade.
    pub counts: bool,
    /// `None` means unlimited attempts.
    pub allowed_attempts: Option<u32>,
    pub submitted: bool,
    pub link: Option<String>,
    pub possible_points: Option<f64>,
    pub submission: Option<Submission>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: Option<u64>,
    pub grade: Option<String>,
    pub score: f64,
    pub possible_points: Option<f64>,
    pub submission_date: Option<DateTime<Utc>>,
    pub graded: bool,
    pub graded_date: Option<DateTime<Utc>>,
    pub late: bool,
    pub missing: bool,
    pub download: Option<String>,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: u64,
    pub name: String,
    pub url: Option<String>,
    pub content_type: Option<String>,
    pub size: Option<u64>,
}

/// An assignment with submission and grading data stripped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAssignment {
    pub id: AssignmentId,
    pub name: String,
    pub description: Option<String>,
    pub position: i64,
    pub due_date: Option<DateTime<Utc>>,
    pub unlock_date: Option<DateTime<Utc>>,
    pub counts: bool,
    pub allowed_attempts: Option<u32>,
    pub link: Option<String>,
    pub possible_points: Option<f64>,
}

impl Record for Assignment {
    type Id = AssignmentId;

    fn id(&self) -> AssignmentId {
        self.id
    }

    fn position(&self) -> i64 {
        self.position
    }
}

impl Submission {
    fn from_payload(
        payload: SubmissionPayload,
        possible_points: Option<f64>,
        download: Option<String>,
    ) -> Self {
        Self {
            id: payload.id,
            grade: payload.grade,
            score: payload.score.unwrap_or(UNGRADED_SCORE),
            possible_points,
            submission_date: parse_timestamp(payload.submitted_at.as_deref()),
            graded: payload.workflow_state.as_deref() == Some("graded"),
            graded_date: parse_timestamp(payload.graded_at.as_deref()),
            late: payload.late.unwrap_or(false),
            missing: payload.missing.unwrap_or(false),
            download,
            attachments: payload
                .attachments
                .unwrap_or_default()
                .into_iter()
                .map(Attachment::from)
                .collect(),
        }
    }

    pub fn is_scored(&self) -> bool {
        self.score >= 0.0
    }
}

impl From<AssignmentPayload> for Assignment {
    fn from(payload: AssignmentPayload) -> Self {
        let possible_points = payload.points_possible;
        let download = payload.submissions_download_url;
        let submission = payload
            .submission
            .map(|submission| Submission::from_payload(submission, possible_points, download));

        Self {
            id: payload.id,
            name: payload.name.unwrap_or_default(),
            description: payload.description,
            position: payload.position.unwrap_or_default(),
            due_date: parse_timestamp(payload.due_at.as_deref()),
            unlock_date: parse_timestamp(payload.unlock_at.as_deref()),
            counts: !payload.omit_from_final_grade.unwrap_or(false),
            allowed_attempts: allowed_attempts(payload.allowed_attempts),
            submitted: payload.has_submitted_submissions.unwrap_or(false),
            link: payload.html_url,
            possible_points,
            submission,
        }
    }
}

impl From<AttachmentPayload> for Attachment {
    fn from(payload: AttachmentPayload) -> Self {
        Self {
            id: payload.id,
            name: payload.display_name.or(payload.filename).unwrap_or_default(),
            url: payload.url,
            content_type: payload.content_type,
            size: payload.size,
        }
    }
}

impl From<&Assignment> for PublicAssignment {
    fn from(assignment: &Assignment) -> Self {
        Self {
            id: assignment.id,
            name: assignment.name.clone(),
            description: assignment.description.clone(),
            position: assignment.position,
            due_date: assignment.due_date,
            unlock_date: assignment.unlock_date,
            counts: assignment.counts,
            allowed_attempts: assignment.allowed_attempts,
            link: assignment.link.clone(),
            possible_points: assignment.possible_points,
        }
    }
}
