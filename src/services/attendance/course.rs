use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AttendanceService;
use super::register::today;
use crate::models::attendance::requests::CourseAttendanceQuery;
use crate::models::attendance::responses::{AttendanceItem, CourseAttendanceResponse};
use crate::models::courses::entities::normalize_course;
use crate::models::ErrorCode;
use crate::models::ApiResponse;
use crate::services::course_access::can_access;
use crate::services::{bad_request, forbidden, internal_error, require_context};
use crate::utils::validate::parse_iso_date;

/// Records of a course on one date, optionally of one type, in roster order.
pub async fn course_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
    query: CourseAttendanceQuery,
) -> ActixResult<HttpResponse> {
    let ctx = match require_context(request) {
        Ok(ctx) => ctx,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    let Some(course) = normalize_course(&query.curso) else {
        return Ok(bad_request(
            ErrorCode::CourseInvalid,
            format!("Curso inválido: {}", query.curso),
        ));
    };
    let date = match query.fecha.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => today(),
        Some(raw) => match parse_iso_date(raw) {
            Some(date) => date,
            None => {
                return Ok(bad_request(
                    ErrorCode::BadRequest,
                    format!("Fecha inválida: {raw} (use AAAA-MM-DD)"),
                ));
            }
        },
    };

    match can_access(&storage, &ctx.user, course).await {
        Ok(true) => {}
        Ok(false) => {
            return Ok(forbidden(
                ErrorCode::CoursePermissionDenied,
                "No tenés permisos para ese curso.",
            ));
        }
        Err(e) => return Ok(internal_error(format!("Error resolviendo cursos: {e}"))),
    }

    let roster = match storage.list_students_by_course(course).await {
        Ok(roster) => roster,
        Err(e) => return Ok(internal_error(format!("Error consultando alumnos: {e}"))),
    };
    let ids: Vec<i64> = roster.iter().map(|s| s.id).collect();
    let attendance_type = query.tipo.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let records = match storage.find_attendance(&ids, date, attendance_type).await {
        Ok(records) => records,
        Err(e) => return Ok(internal_error(format!("Error consultando asistencias: {e}"))),
    };

    let mut by_student: HashMap<i64, Vec<_>> = HashMap::new();
    for record in &records {
        by_student.entry(record.student_id).or_default().push(record);
    }
    let items = roster
        .iter()
        .flat_map(|student| {
            by_student
                .get(&student.id)
                .into_iter()
                .flatten()
                .map(move |record| AttendanceItem::from_record(record, student))
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        CourseAttendanceResponse {
            curso: course.to_string(),
            fecha: date,
            items,
        },
        "OK",
    )))
}
