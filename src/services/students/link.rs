use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::StudentService;
use crate::models::students::requests::LinkStudentAccountsRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{bad_request, internal_error, not_found, require_context};

pub async fn link_accounts(
    service: &StudentService,
    request: &HttpRequest,
    student_id: i64,
    req: LinkStudentAccountsRequest,
) -> ActixResult<HttpResponse> {
    let ctx = match require_context(request) {
        Ok(ctx) => ctx,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    if req.is_empty() {
        return Ok(bad_request(
            ErrorCode::StudentLinkFailed,
            "Indicá padre_id y/o usuario_id",
        ));
    }

    for user_id in [req.parent_user_id, req.user_id].into_iter().flatten().flatten() {
        match storage.get_user_by_id(user_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Ok(not_found(
                    ErrorCode::UserNotFound,
                    format!("Usuario {user_id} no encontrado"),
                ));
            }
            Err(e) => return Ok(internal_error(format!("Error consultando usuarios: {e}"))),
        }
    }

    match storage.link_student_accounts(student_id, req).await {
        Ok(Some(student)) => {
            info!("User {} updated account links of student {}", ctx.user_id(), student_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(student, "Vínculos actualizados")))
        }
        Ok(None) => Ok(not_found(ErrorCode::StudentNotFound, "Alumno no encontrado.")),
        Err(e) => Ok(internal_error(format!("Error actualizando vínculos: {e}"))),
    }
}
