use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::attendance::requests::CourseAttendanceQuery;
use crate::models::common::PaginationQuery;
use crate::models::users::entities::UserRole;
use crate::services::AttendanceService;
use crate::utils::{SafeIDI64, SafeStudentIdI64};

static ATTENDANCE_SERVICE: Lazy<AttendanceService> = Lazy::new(AttendanceService::new_lazy);

// JSON or urlencoded body, parsed by the service
pub async fn register_attendance(req: HttpRequest, body: web::Bytes) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE.register(&req, body).await
}

pub async fn justify_attendance(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Bytes,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE.justify(&req, path.0, body).await
}

pub async fn attendance_detail(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Bytes,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE.detail(&req, path.0, body).await
}

pub async fn student_history(
    req: HttpRequest,
    path: SafeStudentIdI64,
    query: web::Query<PaginationQuery>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .student_history(&req, path.0, query.into_inner())
        .await
}

pub async fn course_attendance(
    req: HttpRequest,
    query: web::Query<CourseAttendanceQuery>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .course_attendance(&req, query.into_inner())
        .await
}

pub async fn my_courses(req: HttpRequest) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE.my_courses(&req).await
}

pub async fn list_types() -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE.list_types().await
}

pub fn configure_attendance_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/attendance")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/register")
                    .route(web::post().to(register_attendance))
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles()).or_staff()),
            )
            .service(
                web::resource("/course")
                    .route(web::get().to(course_attendance))
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles()).or_staff()),
            )
            // Everyone may ask; non-staff get an empty list
            .service(web::resource("/courses").route(web::get().to(my_courses)))
            .service(web::resource("/types").route(web::get().to(list_types)))
            // Staff with course access or the student's linked accounts, checked in the service
            .service(web::resource("/students/{student_id}").route(web::get().to(student_history)))
            .service(
                web::resource("/{id}/justify")
                    .route(web::get().to(justify_attendance))
                    .route(web::post().to(justify_attendance))
                    .route(web::put().to(justify_attendance))
                    .route(web::patch().to(justify_attendance))
                    .wrap(
                        middlewares::RequireRole::new_any(UserRole::preceptor_roles()).or_staff(),
                    ),
            )
            .service(
                web::resource("/{id}/detail")
                    .route(web::get().to(attendance_detail))
                    .route(web::post().to(attendance_detail))
                    .route(web::put().to(attendance_detail))
                    .route(web::patch().to(attendance_detail))
                    .wrap(
                        middlewares::RequireRole::new_any(UserRole::preceptor_roles()).or_staff(),
                    ),
            ),
    );
}
