use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::canvas::dto::{AnnouncementPayload, AuthorPayload};
use crate::models::record_store::Record;
use crate::parse::parse_timestamp;

pub type AnnouncementId = u64;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: AnnouncementId,
    pub title: String,
    pub message: String,
    pub created: Option<DateTime<Utc>>,
    pub position: i64,
    pub read: bool,
    pub author: Author,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Author {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub link: Option<String>,
}

/// An announcement with its read state stripped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAnnouncement {
    pub id: AnnouncementId,
    pub title: String,
    pub message: String,
    pub created: Option<DateTime<Utc>>,
    pub position: i64,
    pub author: Author,
    pub link: Option<String>,
}

impl Record for Announcement {
    type Id = AnnouncementId;

    fn id(&self) -> AnnouncementId {
        self.id
    }

    fn position(&self) -> i64 {
        self.position
    }
}

impl From<AnnouncementPayload> for Announcement {
    fn from(payload: AnnouncementPayload) -> Self {
        Self {
            id: payload.id,
            title: payload.title.unwrap_or_default(),
            message: payload.message.unwrap_or_default(),
            created: parse_timestamp(payload.posted_at.as_deref()),
            position: payload.position.unwrap_or_default(),
            read: payload.read_state.as_deref() == Some("read"),
            author: payload.author.map(Author::from).unwrap_or_default(),
            link: payload.url.or(payload.html_url),
        }
    }
}

impl From<AuthorPayload> for Author {
    fn from(payload: AuthorPayload) -> Self {
        Self {
            id: payload.id,
            name: payload.display_name,
            link: payload.html_url,
        }
    }
}

impl From<&Announcement> for PublicAnnouncement {
    fn from(announcement: &Announcement) -> Self {
        Self {
            id: announcement.id,
            title: announcement.title.clone(),
            message: announcement.message.clone(),
            created: announcement.created,
            position: announcement.position,
            author: announcement.author.clone(),
            link: announcement.link.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> AnnouncementPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn translates_read_state_and_author() {
        let announcement = Announcement::from(payload(json!({
            "id": 5,
            "title": "Midterm",
            "message": "<p>Room change</p>",
            "posted_at": "2020-10-01T12:00:00Z",
            "position": 2,
            "read_state": "read",
            "author": { "id": 9, "display_name": "Prof", "html_url": "https://q/users/9" },
            "url": "https://q/courses/1/discussion_topics/5",
            "context_code": "course_1"
        })));

        assert!(announcement.read);
        assert_eq!(announcement.author.name.as_deref(), Some("Prof"));
        assert_eq!(announcement.position, 2);
        assert!(announcement.created.is_some());
    }

    #[test]
    fn missing_author_is_empty() {
        let announcement = Announcement::from(payload(json!({
            "id": 5,
            "read_state": "unread",
            "context_code": "course_1"
        })));

        assert!(!announcement.read);
        assert_eq!(announcement.author, Author::default());
        assert_eq!(announcement.title, "");
    }
}
