use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::notifications::requests::RecentNotificationsQuery;
use crate::services::NotificationService;
use crate::utils::SafeNotificationIdI64;

static NOTIFICATION_SERVICE: Lazy<NotificationService> =
    Lazy::new(NotificationService::new_lazy);

pub async fn list_recent(
    req: HttpRequest,
    query: web::Query<RecentNotificationsQuery>,
) -> ActixResult<HttpResponse> {
    NOTIFICATION_SERVICE
        .list_recent(&req, query.into_inner())
        .await
}

pub async fn unread_count(req: HttpRequest) -> ActixResult<HttpResponse> {
    NOTIFICATION_SERVICE.get_unread_count(&req).await
}

pub async fn mark_read(req: HttpRequest, path: SafeNotificationIdI64) -> ActixResult<HttpResponse> {
    NOTIFICATION_SERVICE.mark_read(&req, path.0).await
}

pub async fn mark_all_read(req: HttpRequest) -> ActixResult<HttpResponse> {
    NOTIFICATION_SERVICE.mark_all_read(&req).await
}

// Every route only touches the caller's own inbox
pub fn configure_notification_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/notifications")
            .wrap(middlewares::RequireJWT)
            .service(web::resource("").route(web::get().to(list_recent)))
            .service(web::resource("/unread-count").route(web::get().to(unread_count)))
            .service(web::resource("/read-all").route(web::post().to(mark_all_read)))
            .service(web::resource("/{notification_id}/read").route(web::post().to(mark_read))),
    );
}
