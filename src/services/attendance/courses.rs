use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AttendanceService;
use crate::models::ApiResponse;
use crate::models::courses::entities::Course;
use crate::models::courses::responses::MyCoursesResponse;
use crate::services::course_access::allowed_courses;
use crate::services::{internal_error, require_context};

pub async fn my_courses(
    service: &AttendanceService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let ctx = match require_context(request) {
        Ok(ctx) => ctx,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    let scope = match allowed_courses(&storage, &ctx.user).await {
        Ok(scope) => scope,
        Err(e) => return Ok(internal_error(format!("Error resolviendo cursos: {e}"))),
    };

    let courses = scope
        .courses()
        .into_iter()
        .map(Course::from_code)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        MyCoursesResponse {
            courses,
            unrestricted: scope.is_unrestricted(),
        },
        "OK",
    )))
}
