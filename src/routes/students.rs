use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::students::requests::LinkStudentAccountsRequest;
use crate::models::users::entities::UserRole;
use crate::services::StudentService;
use crate::utils::SafeIDI64;

static STUDENT_SERVICE: Lazy<StudentService> = Lazy::new(StudentService::new_lazy);

pub async fn link_accounts(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<LinkStudentAccountsRequest>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE
        .link_accounts(&req, path.0, body.into_inner())
        .await
}

pub fn configure_student_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/students")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/{id}/links")
                    .route(web::put().to(link_accounts))
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
            ),
    );
}
