use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::canvas::dto::CoursePayload;
use crate::models::{Course, CourseId, CourseSnapshot, merge_course};

/// How a course listing was obtained.
#[derive(Debug, Clone, Copy)]
pub struct ListingContext {
    pub year_start: DateTime<Utc>,
    pub now: DateTime<Utc>,
    /// The listing was requested with `enrollment_state=active`.
    pub active_only: bool,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Reconciled {
    /// Ids seen for the first time.
    pub added: usize,
    /// Every id present in the listing, in listing order.
    pub listed: Vec<CourseId>,
    /// Entries dropped because they carried no course code.
    pub skipped: usize,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct CourseFilter {
    #[serde(default)]
    pub active: bool,
    /// Substring of the short code.
    pub code: Option<String>,
}

impl CourseFilter {
    /// A course without a short code never matches a code filter.
    pub fn matches(&self, active: bool, code: Option<&str>) -> bool {
        if self.active && !active {
            return false;
        }
        match self.code.as_deref() {
            Some(wanted) => code.is_some_and(|short| short.contains(wanted)),
            None => true,
        }
    }
}

#[derive(Debug, Default)]
pub struct CourseRegistry {
    courses: BTreeMap<CourseId, Course>,
    /// Ids returned by the most recent active-only listing.
    active_ids: Option<HashSet<CourseId>>,
}

impl CourseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a fresh listing into the registry.
    ///
    /// Listing fields of every course are rebuilt from the payload, while the
    /// permissions, announcements and assignments of already known ids are carried
    /// over. Nothing is ever removed.
    pub fn reconcile(&mut self, listing: Vec<CoursePayload>, context: &ListingContext) -> Reconciled {
        let mut outcome = Reconciled::default();

        let mut fresh = Vec::with_capacity(listing.len());
        for payload in listing {
            let id = payload.id;
            match Course::from_payload(payload, context.year_start, context.now) {
                Some(course) => fresh.push(course),
                None => {
                    debug!("Skipping course {} without a course code", id);
                    outcome.skipped += 1;
                }
            }
        }

        if context.active_only {
            let active_ids: HashSet<CourseId> = fresh.iter().map(|course| course.id).collect();
            for course in self.courses.values_mut() {
                course.active = active_ids.contains(&course.id);
            }
            self.active_ids = Some(active_ids);
        }

        for mut course in fresh {
            if let Some(active_ids) = &self.active_ids {
                course.active = active_ids.contains(&course.id);
            }

            let id = course.id;
            outcome.listed.push(id);
            let course = match self.courses.remove(&id) {
                Some(old) => merge_course(old, course),
                None => {
                    outcome.added += 1;
                    course
                }
            };
            self.courses.insert(id, course);
        }

        outcome
    }

    pub fn get(&self, id: CourseId) -> Option<&Course> {
        self.courses.get(&id)
    }

    pub fn get_mut(&mut self, id: CourseId) -> Option<&mut Course> {
        self.courses.get_mut(&id)
    }

    pub fn contains(&self, id: CourseId) -> bool {
        self.courses.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    pub fn ids(&self) -> Vec<CourseId> {
        self.courses.keys().copied().collect()
    }

    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.values()
    }

    /// True when at least one course is known and every known course is active.
    pub fn all_active(&self) -> bool {
        !self.courses.is_empty() && self.courses.values().all(|course| course.active)
    }

    pub fn active_ids(&self) -> Option<&HashSet<CourseId>> {
        self.active_ids.as_ref()
    }

    pub fn filter(&self, filter: &CourseFilter) -> Vec<&Course> {
        self.courses
            .values()
            .filter(|course| filter.matches(course.active, course.code.as_deref()))
            .collect()
    }

    pub fn snapshots(&self) -> Vec<CourseSnapshot> {
        self.courses.values().map(Course::to_snapshot).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Announcement, Permissions, READ_GRADES};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn context(active_only: bool) -> ListingContext {
        ListingContext {
            year_start: Utc.with_ymd_and_hms(2020, 7, 1, 0, 0, 0).unwrap(),
            now: Utc.with_ymd_and_hms(2020, 10, 1, 0, 0, 0).unwrap(),
            active_only,
        }
    }

    fn listing(value: serde_json::Value) -> Vec<CoursePayload> {
        serde_json::from_value(value).unwrap()
    }

    fn announcement(id: u64) -> Announcement {
        Announcement {
            id,
            title: "hello".to_string(),
            message: String::new(),
            created: None,
            position: 0,
            read: false,
            author: Default::default(),
            link: None,
        }
    }

    #[test]
    fn new_ids_are_counted_and_restricted_courses_dropped() {
        let mut registry = CourseRegistry::new();
        let outcome = registry.reconcile(
            listing(json!([
                { "id": 1, "name": "Chemistry", "course_code": "CHM136H1", "start_at": "2020-09-01T00:00:00Z" },
                { "id": 2, "access_restricted_by_date": true },
                { "id": 3, "name": "Old", "course_code": "MAT185Y1", "start_at": "2019-09-01T00:00:00Z" }
            ])),
            &context(false),
        );

        assert_eq!(outcome, Reconciled { added: 2, listed: vec![1, 3], skipped: 1 });
        assert!(registry.get(1).unwrap().active);
        assert!(!registry.get(3).unwrap().active);
        assert!(!registry.contains(2));
    }

    #[test]
    fn refresh_keeps_children_and_permissions() {
        let mut registry = CourseRegistry::new();
        registry.reconcile(
            listing(json!([{ "id": 1, "name": "Before", "course_code": "CHM136H1" }])),
            &context(false),
        );

        let course = registry.get_mut(1).unwrap();
        course.update_permissions(Permissions::from([(READ_GRADES.to_string(), true)]));
        course.add_announcement(announcement(10));

        let outcome = registry.reconcile(
            listing(json!([{ "id": 1, "name": "After", "course_code": "CHM137H1 LEC0101" }])),
            &context(false),
        );

        assert_eq!(outcome.added, 0);
        let course = registry.get(1).unwrap();
        assert_eq!(course.name, "After");
        assert_eq!(course.code.as_deref(), Some("CHM137"));
        assert!(course.is_lecture);
        assert!(course.has_permission(READ_GRADES));
        assert_eq!(course.announcements(), vec![&announcement(10)]);
    }

    #[test]
    fn active_listing_drives_later_full_listings() {
        let mut registry = CourseRegistry::new();
        registry.reconcile(
            listing(json!([{ "id": 1, "course_code": "CHM136H1", "start_at": "2019-01-01T00:00:00Z" }])),
            &context(true),
        );
        assert!(registry.get(1).unwrap().active);
        assert!(registry.all_active());

        registry.reconcile(
            listing(json!([
                { "id": 1, "course_code": "CHM136H1", "start_at": "2019-01-01T00:00:00Z" },
                { "id": 2, "course_code": "ESC194H1", "start_at": "2020-09-01T00:00:00Z" }
            ])),
            &context(false),
        );

        // Membership in the last active listing wins over start dates.
        assert!(registry.get(1).unwrap().active);
        assert!(!registry.get(2).unwrap().active);
        assert!(!registry.all_active());
    }

    #[test]
    fn active_listing_deactivates_missing_courses() {
        let mut registry = CourseRegistry::new();
        registry.reconcile(
            listing(json!([
                { "id": 1, "course_code": "CHM136H1" },
                { "id": 2, "course_code": "ESC194H1" }
            ])),
            &context(true),
        );
        registry.reconcile(listing(json!([{ "id": 2, "course_code": "ESC194H1" }])), &context(true));

        assert!(!registry.get(1).unwrap().active);
        assert!(registry.get(2).unwrap().active);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn filter_by_active_and_code() {
        let mut registry = CourseRegistry::new();
        registry.reconcile(
            listing(json!([
                { "id": 1, "course_code": "ESC194H1", "start_at": "2020-09-01T00:00:00Z" },
                { "id": 2, "course_code": "ESC195H1", "start_at": "2019-09-01T00:00:00Z" },
                { "id": 3, "course_code": "Engineering Society", "start_at": "2020-09-01T00:00:00Z" }
            ])),
            &context(false),
        );

        let ids = |filter: CourseFilter| -> Vec<CourseId> {
            registry.filter(&filter).iter().map(|course| course.id).collect()
        };

        assert_eq!(ids(CourseFilter::default()), vec![1, 2, 3]);
        assert_eq!(ids(CourseFilter { active: true, code: None }), vec![1, 3]);
        assert_eq!(ids(CourseFilter { active: false, code: Some("ESC".to_string()) }), vec![1, 2]);
        assert_eq!(ids(CourseFilter { active: true, code: Some("ESC194".to_string()) }), vec![1]);
    }
}
