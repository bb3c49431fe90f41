use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::CourseAssignmentService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{internal_error, not_found, require_context};

pub async fn delete_assignment(
    service: &CourseAssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
) -> ActixResult<HttpResponse> {
    let ctx = match require_context(request) {
        Ok(ctx) => ctx,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    match storage.delete_course_assignment(assignment_id).await {
        Ok(true) => {
            info!("User {} deleted course assignment {}", ctx.user_id(), assignment_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Asignación eliminada")))
        }
        Ok(false) => Ok(not_found(
            ErrorCode::AssignmentNotFound,
            "Asignación no encontrada",
        )),
        Err(e) => Ok(internal_error(format!("Error eliminando la asignación: {e}"))),
    }
}
