use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::grades::requests::{BulkCreateGradesRequest, CreateGradeRequest};
use crate::models::users::entities::UserRole;
use crate::services::GradeService;

static GRADE_SERVICE: Lazy<GradeService> = Lazy::new(GradeService::new_lazy);

pub async fn create_grade(
    req: HttpRequest,
    body: web::Json<CreateGradeRequest>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.create_grade(&req, body.into_inner()).await
}

pub async fn create_grades_bulk(
    req: HttpRequest,
    body: web::Json<BulkCreateGradesRequest>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE
        .create_grades_bulk(&req, body.into_inner())
        .await
}

pub fn configure_grade_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/grades")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::post().to(create_grade))
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles()).or_staff()),
            )
            .service(
                web::resource("/bulk")
                    .route(web::post().to(create_grades_bulk))
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles()).or_staff()),
            ),
    );
}
