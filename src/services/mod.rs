pub mod attendance;
pub mod course_access;
pub mod course_assignments;
pub mod events;
pub mod grades;
pub mod messages;
pub mod notifications;
pub mod sanctions;
pub mod students;

pub use attendance::AttendanceService;
pub use course_assignments::CourseAssignmentService;
pub use events::EventService;
pub use grades::GradeService;
pub use messages::MessageService;
pub use notifications::NotificationService;
pub use sanctions::SanctionService;
pub use students::StudentService;

use actix_web::{HttpRequest, HttpResponse};

use crate::middlewares::{RequestContext, RequireJWT};
use crate::models::{ApiResponse, ErrorCode};

/// Caller resolved by `RequireJWT`, or the 401 to return.
pub(crate) fn require_context(request: &HttpRequest) -> Result<RequestContext, HttpResponse> {
    RequireJWT::extract_context(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "No autenticado",
        ))
    })
}

pub(crate) fn internal_error(message: impl Into<String>) -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        message,
    ))
}

pub(crate) fn bad_request(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn forbidden(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn not_found(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(code, message))
}
