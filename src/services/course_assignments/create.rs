use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::CourseAssignmentService;
use crate::errors::BoletinError;
use crate::models::course_assignments::requests::CreateAssignmentRequest;
use crate::models::courses::entities::normalize_course;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{bad_request, internal_error, not_found, require_context};

pub async fn create_assignment(
    service: &CourseAssignmentService,
    request: &HttpRequest,
    req: CreateAssignmentRequest,
) -> ActixResult<HttpResponse> {
    let ctx = match require_context(request) {
        Ok(ctx) => ctx,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    let Some(course) = normalize_course(&req.curso) else {
        return Ok(bad_request(
            ErrorCode::CourseInvalid,
            format!("Curso inválido: {}", req.curso),
        ));
    };

    match storage.get_user_by_id(req.user_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found(ErrorCode::UserNotFound, "Usuario no encontrado")),
        Err(e) => return Ok(internal_error(format!("Error consultando usuarios: {e}"))),
    }

    match storage
        .create_course_assignment(req.user_id, course, req.kind)
        .await
    {
        Ok(assignment) => {
            info!(
                "User {} assigned {} to {} as {}",
                ctx.user_id(),
                req.user_id,
                course,
                req.kind
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(assignment, "Asignación creada")))
        }
        Err(BoletinError::Conflict(_)) => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(ErrorCode::AssignmentAlreadyExists, "La asignación ya existe"),
        )),
        Err(e) => Ok(internal_error(format!("Error creando la asignación: {e}"))),
    }
}
