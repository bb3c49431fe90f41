use std::collections::HashMap;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::GradeService;
use super::validate::{GradeInput, resolve_student, validate_raw_grade};
use crate::models::grades::entities::NewGrade;
use crate::models::grades::requests::BulkCreateGradesRequest;
use crate::models::grades::responses::{BulkGradeError, BulkGradesResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::attendance::register::today;
use crate::services::course_access::allowed_courses;
use crate::services::notifications::fanout::notify_grades;
use crate::services::students::lookup_students;
use crate::services::{internal_error, require_context};

/// 201 when every entry was stored, 207 when only some were, 400 when none.
pub(crate) fn bulk_status(created: usize, failed: usize) -> StatusCode {
    match (created, failed) {
        (0, _) => StatusCode::BAD_REQUEST,
        (_, 0) => StatusCode::CREATED,
        _ => StatusCode::MULTI_STATUS,
    }
}

pub async fn create_grades_bulk(
    service: &GradeService,
    request: &HttpRequest,
    req: BulkCreateGradesRequest,
) -> ActixResult<HttpResponse> {
    let ctx = match require_context(request) {
        Ok(ctx) => ctx,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);
    let today = today();

    let mut errors = Vec::new();
    let mut inputs: Vec<(usize, GradeInput)> = Vec::with_capacity(req.notas.len());
    for (index, raw) in req.notas.into_iter().enumerate() {
        match validate_raw_grade(raw, today) {
            Ok(input) => inputs.push((index, input)),
            Err(detalle) => errors.push(BulkGradeError { index, detalle }),
        }
    }

    let students: HashMap<_, _> =
        match lookup_students(&storage, inputs.iter().map(|(_, input)| &input.key)).await {
            Ok(students) => students.into_iter().map(|s| (s.id, s)).collect(),
            Err(e) => return Ok(internal_error(format!("Error consultando alumnos: {e}"))),
        };
    let scope = match allowed_courses(&storage, &ctx.user).await {
        Ok(scope) => scope,
        Err(e) => return Ok(internal_error(format!("Error resolviendo cursos: {e}"))),
    };

    let mut new_grades: Vec<NewGrade> = Vec::with_capacity(inputs.len());
    for (index, input) in inputs {
        match resolve_student(&input.key, &students, &scope) {
            Ok(student) => new_grades.push(input.into_new_grade(student.id, ctx.user_id())),
            Err(detalle) => errors.push(BulkGradeError { index, detalle }),
        }
    }
    errors.sort_by_key(|e| e.index);

    let created = if new_grades.is_empty() {
        Vec::new()
    } else {
        match storage.create_grades(new_grades).await {
            Ok(created) => created,
            Err(e) => return Ok(internal_error(format!("Error guardando notas: {e}"))),
        }
    };

    let status = bulk_status(created.len(), errors.len());
    if created.is_empty() {
        return Ok(HttpResponse::build(status).json(ApiResponse::error(
            ErrorCode::GradeInvalid,
            BulkGradesResponse {
                creadas: Vec::new(),
                errores: errors,
                notificados: 0,
                notif_error: None,
            },
            "No se guardó ninguna nota",
        )));
    }

    let report = notify_grades(&storage, &created, &students, &ctx.user).await;
    info!(
        "User {} created {} grades ({} rejected)",
        ctx.user_id(),
        created.len(),
        errors.len()
    );

    let message = if errors.is_empty() {
        "Notas guardadas"
    } else {
        "Algunas notas no se guardaron"
    };
    let body = BulkGradesResponse {
        creadas: created,
        errores: errors,
        notificados: report.notified,
        notif_error: report.visible_error(&ctx),
    };
    if status == StatusCode::MULTI_STATUS {
        return Ok(HttpResponse::build(status).json(ApiResponse::error(
            ErrorCode::PartialSuccess,
            body,
            message,
        )));
    }
    Ok(HttpResponse::build(status).json(ApiResponse::success(body, message)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_status() {
        assert_eq!(bulk_status(3, 0), StatusCode::CREATED);
        assert_eq!(bulk_status(2, 1), StatusCode::MULTI_STATUS);
        assert_eq!(bulk_status(0, 2), StatusCode::BAD_REQUEST);
        assert_eq!(bulk_status(0, 0), StatusCode::BAD_REQUEST);
    }
}
