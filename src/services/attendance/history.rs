use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AttendanceService;
use crate::middlewares::RequestContext;
use crate::models::attendance::responses::{AttendanceItem, StudentAttendanceResponse};
use crate::models::common::{PaginationInfo, PaginationQuery};
use crate::models::students::entities::Student;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::course_access::can_access;
use crate::services::{forbidden, internal_error, not_found, require_context};

/// The student's own account, a linked parent, or the account named after
/// the enrollment code.
pub(crate) fn is_linked_account(ctx: &RequestContext, student: &Student) -> bool {
    let user = &ctx.user;
    student.parent_user_id == Some(user.id)
        || student.user_id == Some(user.id)
        || user
            .username
            .eq_ignore_ascii_case(student.enrollment_code.trim())
}

pub async fn student_history(
    service: &AttendanceService,
    request: &HttpRequest,
    student_id: i64,
    query: PaginationQuery,
) -> ActixResult<HttpResponse> {
    let ctx = match require_context(request) {
        Ok(ctx) => ctx,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    let student = match storage.get_student_by_id(student_id).await {
        Ok(Some(student)) => student,
        Ok(None) => return Ok(not_found(ErrorCode::StudentNotFound, "Alumno no encontrado.")),
        Err(e) => return Ok(internal_error(format!("Error consultando el alumno: {e}"))),
    };

    if !is_linked_account(&ctx, &student) {
        match can_access(&storage, &ctx.user, &student.course).await {
            Ok(true) => {}
            Ok(false) => {
                return Ok(forbidden(
                    ErrorCode::CoursePermissionDenied,
                    "No tenés permisos para ver este alumno.",
                ));
            }
            Err(e) => return Ok(internal_error(format!("Error resolviendo cursos: {e}"))),
        }
    }

    let (page, size) = query.normalized();

    let (records, total) = match storage
        .list_attendance_by_student(student.id, page, size)
        .await
    {
        Ok(result) => result,
        Err(e) => return Ok(internal_error(format!("Error consultando asistencias: {e}"))),
    };
    let total_faltas = match storage.student_absence_total(student.id).await {
        Ok(total) => total,
        Err(e) => return Ok(internal_error(format!("Error consultando asistencias: {e}"))),
    };

    let response = StudentAttendanceResponse {
        alumno_id: student.id,
        items: records
            .iter()
            .map(|record| AttendanceItem::from_record(record, &student))
            .collect(),
        pagination: PaginationInfo::new(page, size, total),
        total_faltas,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "OK")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::{User, UserRole, UserStatus};
    use chrono::Utc;

    fn ctx(id: i64, username: &str) -> RequestContext {
        RequestContext::new(
            User {
                id,
                username: username.to_string(),
                email: None,
                display_name: None,
                role: UserRole::Parent,
                is_staff: false,
                status: UserStatus::Active,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            None,
        )
    }

    #[test]
    fn test_linked_accounts() {
        let student = Student {
            id: 1,
            enrollment_code: "LEG01".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Paz".to_string(),
            course: "1A".to_string(),
            parent_user_id: Some(5),
            user_id: Some(6),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(is_linked_account(&ctx(5, "padre"), &student));
        assert!(is_linked_account(&ctx(6, "ana"), &student));
        assert!(is_linked_account(&ctx(9, "leg01"), &student));
        assert!(!is_linked_account(&ctx(9, "otro"), &student));
    }
}
