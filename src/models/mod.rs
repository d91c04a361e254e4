pub mod announcement;
pub mod assignment;
pub mod course;
pub mod record_store;

pub use announcement::{Announcement, AnnouncementId, Author, PublicAnnouncement};
pub use assignment::{Assignment, AssignmentId, Attachment, PublicAssignment, Submission, UNGRADED_SCORE};
pub use course::{
    Course, CourseId, CourseSnapshot, Permissions, PublicCourseSnapshot, Tab, Teacher, Term,
    READ_ANNOUNCEMENTS, READ_GRADES, merge_course,
};
pub use record_store::{Record, RecordStore};
