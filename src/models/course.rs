use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::canvas::dto::{CoursePayload, TabPayload, TeacherPayload, TermPayload};
use crate::models::announcement::{Announcement, PublicAnnouncement};
use crate::models::assignment::{Assignment, PublicAssignment};
use crate::models::record_store::RecordStore;
use crate::parse::{is_lecture, parse_timestamp, short_code};

pub type CourseId = u64;
pub type Permissions = HashMap<String, bool>;

pub const READ_ANNOUNCEMENTS: &str = "read_announcements";
pub const READ_GRADES: &str = "read_grades";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Term {
    pub name: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Teacher {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tab {
    pub id: String,
    pub label: String,
    pub link: Option<String>,
    pub position: i64,
}

/// A course as last seen in a listing, plus everything fetched for it since.
///
/// Listing fields are public and get fully recomputed on every refresh. The
/// permission set, both record stores and the sync stamps are private: they
/// only change through the methods below and survive a refresh via
/// [`merge_course`].
#[derive(Debug, Clone)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub raw_code: String,
    pub code: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub active: bool,
    pub term: Term,
    pub teachers: Vec<Teacher>,
    pub tabs: Vec<Tab>,
    pub total_students: Option<u32>,
    pub course_img: Option<String>,
    pub calendar_link: String,
    pub is_lecture: bool,

    permissions: Option<Permissions>,
    announcements: RecordStore<Announcement>,
    assignments: RecordStore<Assignment>,
    last_announcement_sync: Option<DateTime<Utc>>,
    last_assignment_sync: Option<DateTime<Utc>>,
}

impl Course {
    /// Builds a course from a listing entry. Returns `None` for entries without a
    /// course code, which Canvas sends for access-restricted courses.
    ///
    /// `active` is derived as "starts on or after `year_start`"; callers working
    /// from a scoped listing override it afterwards.
    pub fn from_payload(
        payload: CoursePayload,
        year_start: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        let raw_code = payload.course_code?;
        let name = payload.name.unwrap_or_default();
        let start_date = parse_timestamp(payload.start_at.as_deref());

        Some(Self {
            id: payload.id,
            code: short_code(&raw_code),
            is_lecture: is_lecture(Some(name.as_str()), &raw_code),
            active: start_date.is_some_and(|start| start >= year_start),
            start_date,
            end_date: parse_timestamp(payload.end_at.as_deref()),
            term: payload
                .term
                .map(|term| Term::from_payload(term, now))
                .unwrap_or_default(),
            teachers: payload.teachers.into_iter().map(Teacher::from).collect(),
            tabs: payload.tabs.into_iter().map(Tab::from).collect(),
            total_students: payload.total_students,
            course_img: payload.image_download_url,
            calendar_link: payload
                .calendar
                .and_then(|calendar| calendar.ics)
                .unwrap_or_default(),
            name,
            raw_code,
            permissions: None,
            announcements: RecordStore::new(),
            assignments: RecordStore::new(),
            last_announcement_sync: None,
            last_assignment_sync: None,
        })
    }

    /// Replaces the permission set wholesale.
    pub fn update_permissions(&mut self, permissions: Permissions) {
        self.permissions = Some(permissions);
    }

    /// Forgets the permission set so the next sync cycle fetches it again.
    pub fn invalidate_permissions(&mut self) {
        self.permissions = None;
    }

    pub fn permissions(&self) -> Option<&Permissions> {
        self.permissions.as_ref()
    }

    pub fn permissions_known(&self) -> bool {
        self.permissions.is_some()
    }

    /// Unknown permissions and absent names both read as "not granted".
    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions
            .as_ref()
            .and_then(|permissions| permissions.get(name))
            .copied()
            .unwrap_or(false)
    }

    pub fn add_announcement(&mut self, announcement: Announcement) -> bool {
        self.announcements.add(announcement)
    }

    pub fn add_assignment(&mut self, assignment: Assignment) -> bool {
        self.assignments.add(assignment)
    }

    pub fn announcements(&self) -> Vec<&Announcement> {
        self.announcements.view()
    }

    pub fn assignments(&self) -> Vec<&Assignment> {
        self.assignments.view()
    }

    pub fn announcement_store(&self) -> &RecordStore<Announcement> {
        &self.announcements
    }

    pub fn assignment_store(&self) -> &RecordStore<Assignment> {
        &self.assignments
    }

    pub fn mark_announcements_synced(&mut self, at: DateTime<Utc>) {
        self.last_announcement_sync = Some(at);
    }

    pub fn mark_assignments_synced(&mut self, at: DateTime<Utc>) {
        self.last_assignment_sync = Some(at);
    }

    pub fn last_announcement_sync(&self) -> Option<DateTime<Utc>> {
        self.last_announcement_sync
    }

    pub fn last_assignment_sync(&self) -> Option<DateTime<Utc>> {
        self.last_assignment_sync
    }

    pub fn to_snapshot(&self) -> CourseSnapshot {
        CourseSnapshot {
            id: self.id,
            name: self.name.clone(),
            is_lecture: self.is_lecture,
            start_date: self.start_date,
            end_date: self.end_date,
            active: self.active,
            code: self.code.clone(),
            calendar_link: self.calendar_link.clone(),
            term: self.term.clone(),
            course_img: self.course_img.clone(),
            total_students: self.total_students,
            teachers: self.teachers.clone(),
            tabs: self.tabs.clone(),
            announcements: self.announcements().into_iter().cloned().collect(),
            assignments: self.assignments().into_iter().cloned().collect(),
        }
    }
}

/// Carries the accumulated state of `old` (permissions, announcements,
/// assignments, sync stamps) into `new`, whose listing fields win.
pub fn merge_course(old: Course, new: Course) -> Course {
    Course {
        permissions: old.permissions,
        announcements: old.announcements,
        assignments: old.assignments,
        last_announcement_sync: old.last_announcement_sync,
        last_assignment_sync: old.last_assignment_sync,
        ..new
    }
}

impl Term {
    fn from_payload(payload: TermPayload, now: DateTime<Utc>) -> Self {
        let start = parse_timestamp(payload.start_at.as_deref());
        let end = parse_timestamp(payload.end_at.as_deref());
        let bounded = start.is_some() || end.is_some();
        let active = bounded
            && start.is_none_or(|start| start <= now)
            && end.is_none_or(|end| now <= end);

        Self {
            name: payload.name,
            start,
            end,
            active,
        }
    }
}

impl From<TeacherPayload> for Teacher {
    fn from(payload: TeacherPayload) -> Self {
        Self {
            id: payload.id,
            name: payload.display_name,
            avatar: payload.avatar_image_url,
            link: payload.html_url,
        }
    }
}

impl From<TabPayload> for Tab {
    fn from(payload: TabPayload) -> Self {
        Self {
            label: payload.label.unwrap_or_else(|| payload.id.clone()),
            id: payload.id,
            link: payload.html_url,
            position: payload.position.unwrap_or_default(),
        }
    }
}

/// Read-only projection of a course handed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSnapshot<A = Announcement, S = Assignment> {
    pub id: CourseId,
    pub name: String,
    pub is_lecture: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub active: bool,
    pub code: Option<String>,
    pub calendar_link: String,
    pub term: Term,
    pub course_img: Option<String>,
    pub total_students: Option<u32>,
    pub teachers: Vec<Teacher>,
    pub tabs: Vec<Tab>,
    pub announcements: Vec<A>,
    pub assignments: Vec<S>,
}

pub type PublicCourseSnapshot = CourseSnapshot<PublicAnnouncement, PublicAssignment>;

impl CourseSnapshot {
    /// Drops read state from announcements and submission data from assignments.
    pub fn redact(self) -> PublicCourseSnapshot {
        CourseSnapshot {
            id: self.id,
            name: self.name,
            is_lecture: self.is_lecture,
            start_date: self.start_date,
            end_date: self.end_date,
            active: self.active,
            code: self.code,
            calendar_link: self.calendar_link,
            term: self.term,
            course_img: self.course_img,
            total_students: self.total_students,
            teachers: self.teachers,
            tabs: self.tabs,
            announcements: self.announcements.iter().map(PublicAnnouncement::from).collect(),
            assignments: self.assignments.iter().map(PublicAssignment::from).collect(),
        }
    }
}
