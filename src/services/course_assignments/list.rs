use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseAssignmentService;
use crate::models::ErrorCode;
use crate::models::course_assignments::requests::AssignmentListQuery;
use crate::models::course_assignments::responses::AssignmentListResponse;
use crate::models::ApiResponse;
use crate::services::{bad_request, internal_error};

pub async fn list_assignments(
    service: &CourseAssignmentService,
    request: &HttpRequest,
    query: AssignmentListQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let user_id = match query.user_id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => match raw.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                return Ok(bad_request(
                    ErrorCode::AssignmentInvalid,
                    format!("user_id inválido: {raw}"),
                ));
            }
        },
    };

    match storage.list_course_assignments(user_id, query.kind).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            AssignmentListResponse { items },
            "OK",
        ))),
        Err(e) => Ok(internal_error(format!("Error consultando asignaciones: {e}"))),
    }
}
