pub mod request_context;
pub mod require_jwt;
pub mod require_role;

pub use request_context::RequestContext;
pub use require_jwt::RequireJWT;
pub use require_role::RequireRole;

use actix_web::{HttpResponse, http::StatusCode};

use crate::models::{ApiResponse, ErrorCode};

/// JSON envelope for requests rejected before reaching a handler.
pub(crate) fn create_error_response(
    status: StatusCode,
    code: ErrorCode,
    message: &str,
) -> HttpResponse {
    match status {
        StatusCode::NO_CONTENT => HttpResponse::build(status).finish(),
        _ => HttpResponse::build(status).json(ApiResponse::error_empty(code, message)),
    }
}
