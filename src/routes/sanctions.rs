use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::sanctions::requests::CreateSanctionRequest;
use crate::models::users::entities::UserRole;
use crate::services::SanctionService;

static SANCTION_SERVICE: Lazy<SanctionService> = Lazy::new(SanctionService::new_lazy);

pub async fn create_sanction(
    req: HttpRequest,
    body: web::Json<CreateSanctionRequest>,
) -> ActixResult<HttpResponse> {
    SANCTION_SERVICE
        .create_sanction(&req, body.into_inner())
        .await
}

pub fn configure_sanction_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/sanctions")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::post().to(create_sanction))
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles()).or_staff()),
            ),
    );
}
