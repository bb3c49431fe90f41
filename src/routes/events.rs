use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::events::requests::CreateEventRequest;
use crate::models::users::entities::UserRole;
use crate::services::EventService;

static EVENT_SERVICE: Lazy<EventService> = Lazy::new(EventService::new_lazy);

pub async fn create_event(
    req: HttpRequest,
    body: web::Json<CreateEventRequest>,
) -> ActixResult<HttpResponse> {
    EVENT_SERVICE.create_event(&req, body.into_inner()).await
}

pub fn configure_event_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/events")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::post().to(create_event))
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles()).or_staff()),
            ),
    );
}
