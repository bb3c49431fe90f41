use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::warn;

use super::NotificationService;
use crate::models::ApiResponse;
use crate::models::notifications::responses::UnreadCountResponse;
use crate::services::{internal_error, require_context};

/// Polled by the navbar badge.
pub async fn get_unread_count(
    service: &NotificationService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let ctx = match require_context(request) {
        Ok(ctx) => ctx,
        Err(response) => return Ok(response),
    };

    let unread_count = match service
        .get_storage(request)
        .count_unread_notifications(ctx.user_id())
        .await
    {
        Ok(count) => count,
        Err(e) => {
            warn!("Unread count failed for user {}: {}", ctx.user_id(), e);
            return Ok(internal_error("Error consultando notificaciones."));
        }
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        UnreadCountResponse { unread_count },
        "OK",
    )))
}
