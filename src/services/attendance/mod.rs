pub mod course;
pub mod courses;
pub mod detail;
pub mod history;
pub mod justify;
pub mod normalize;
pub mod register;
pub mod types;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::models::attendance::requests::CourseAttendanceQuery;
use crate::models::common::PaginationQuery;
use crate::storage::Storage;

pub struct AttendanceService {
    storage: Option<Arc<dyn Storage>>,
}

impl AttendanceService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub async fn register(
        &self,
        request: &HttpRequest,
        body: web::Bytes,
    ) -> ActixResult<HttpResponse> {
        register::register_attendance(self, request, body).await
    }

    pub async fn justify(
        &self,
        request: &HttpRequest,
        attendance_id: i64,
        body: web::Bytes,
    ) -> ActixResult<HttpResponse> {
        justify::justify_attendance(self, request, attendance_id, body).await
    }

    pub async fn detail(
        &self,
        request: &HttpRequest,
        attendance_id: i64,
        body: web::Bytes,
    ) -> ActixResult<HttpResponse> {
        detail::attendance_detail(self, request, attendance_id, body).await
    }

    pub async fn student_history(
        &self,
        request: &HttpRequest,
        student_id: i64,
        query: PaginationQuery,
    ) -> ActixResult<HttpResponse> {
        history::student_history(self, request, student_id, query).await
    }

    pub async fn course_attendance(
        &self,
        request: &HttpRequest,
        query: CourseAttendanceQuery,
    ) -> ActixResult<HttpResponse> {
        course::course_attendance(self, request, query).await
    }

    pub async fn my_courses(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        courses::my_courses(self, request).await
    }

    pub async fn list_types(&self) -> ActixResult<HttpResponse> {
        types::list_types().await
    }
}

/// Record plus its student, once the caller is known to reach the course.
pub(crate) async fn load_editable_record(
    storage: &Arc<dyn Storage>,
    ctx: &crate::middlewares::RequestContext,
    attendance_id: i64,
) -> Result<
    (
        crate::models::attendance::entities::AttendanceRecord,
        crate::models::students::entities::Student,
    ),
    HttpResponse,
> {
    use crate::models::ErrorCode;
    use crate::services::{course_access::can_access, forbidden, internal_error, not_found};

    let record = match storage.get_attendance_by_id(attendance_id).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            return Err(not_found(
                ErrorCode::AttendanceRecordNotFound,
                "Asistencia no encontrada.",
            ));
        }
        Err(e) => return Err(internal_error(format!("Error consultando la asistencia: {e}"))),
    };
    let student = match storage.get_student_by_id(record.student_id).await {
        Ok(Some(student)) => student,
        Ok(None) => {
            return Err(not_found(ErrorCode::StudentNotFound, "Alumno no encontrado."));
        }
        Err(e) => return Err(internal_error(format!("Error consultando el alumno: {e}"))),
    };

    match can_access(storage, &ctx.user, &student.course).await {
        Ok(true) => Ok((record, student)),
        Ok(false) => Err(forbidden(
            ErrorCode::CoursePermissionDenied,
            "No tenés permisos para ese curso.",
        )),
        Err(e) => Err(internal_error(format!("Error resolviendo cursos: {e}"))),
    }
}
