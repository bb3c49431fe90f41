use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::GradeService;
use super::validate::{resolve_student, validate_grade};
use crate::models::grades::requests::CreateGradeRequest;
use crate::models::grades::responses::GradeCreatedResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::attendance::register::today;
use crate::services::course_access::allowed_courses;
use crate::services::notifications::fanout::notify_grades;
use crate::services::students::lookup_students;
use crate::services::{bad_request, forbidden, internal_error, not_found, require_context};

pub async fn create_grade(
    service: &GradeService,
    request: &HttpRequest,
    req: CreateGradeRequest,
) -> ActixResult<HttpResponse> {
    let ctx = match require_context(request) {
        Ok(ctx) => ctx,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    let input = match validate_grade(&req, today()) {
        Ok(input) => input,
        Err(msg) => return Ok(bad_request(ErrorCode::GradeInvalid, msg)),
    };

    let students: HashMap<_, _> = match lookup_students(&storage, [&input.key]).await {
        Ok(students) => students.into_iter().map(|s| (s.id, s)).collect(),
        Err(e) => return Ok(internal_error(format!("Error consultando el alumno: {e}"))),
    };
    let scope = match allowed_courses(&storage, &ctx.user).await {
        Ok(scope) => scope,
        Err(e) => return Ok(internal_error(format!("Error resolviendo cursos: {e}"))),
    };

    let student_id = match resolve_student(&input.key, &students, &scope) {
        Ok(student) => student.id,
        Err(_) if students.is_empty() => {
            return Ok(not_found(ErrorCode::StudentNotFound, "Alumno no encontrado"));
        }
        Err(msg) => return Ok(forbidden(ErrorCode::CoursePermissionDenied, msg)),
    };

    let grades = match storage
        .create_grades(vec![input.into_new_grade(student_id, ctx.user_id())])
        .await
    {
        Ok(grades) => grades,
        Err(e) => return Ok(internal_error(format!("Error guardando la nota: {e}"))),
    };

    let report = notify_grades(&storage, &grades, &students, &ctx.user).await;
    let Some(grade) = grades.into_iter().next() else {
        return Ok(internal_error("Error guardando la nota"));
    };
    info!("User {} created grade {} for student {}", ctx.user_id(), grade.id, student_id);

    Ok(HttpResponse::Created().json(ApiResponse::success(
        GradeCreatedResponse {
            nota: grade,
            notificados: report.notified,
            notif_error: report.visible_error(&ctx),
        },
        "Nota guardada",
    )))
}
