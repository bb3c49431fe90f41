//! Business models shared by routes, services and storage.
//!
//! Storage converts SeaORM rows into these types; handlers serialize them.

pub mod attendance;
pub mod common;
pub mod course_assignments;
pub mod courses;
pub mod events;
pub mod grades;
pub mod messages;
pub mod notifications;
pub mod sanctions;
pub mod students;
pub mod users;

pub use common::{ApiResponse, PaginationInfo, PaginationQuery};

/// Process start time, shared with handlers through `web::Data`.
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// Numeric codes carried in every response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    InternalServerError = 1500,

    /// Some rows of a batch failed; the rest were stored.
    PartialSuccess = 1207,

    UserNotFound = 2004,

    CourseInvalid = 3000,
    CoursePermissionDenied = 3003,

    StudentNotFound = 4004,
    StudentLinkFailed = 4010,

    AttendanceInvalidPayload = 5000,
    AttendanceRecordNotFound = 5004,
    AttendancePlainPresence = 5009,
    AttendanceSaveFailed = 5010,

    NotificationNotFound = 6004,

    GradeInvalid = 7000,
    SanctionInvalid = 7100,
    EventInvalid = 7200,
    MessageInvalid = 7300,

    AssignmentInvalid = 8000,
    AssignmentNotFound = 8004,
    AssignmentAlreadyExists = 8009,
}
