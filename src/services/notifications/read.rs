use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::debug;

use super::NotificationService;
use crate::models::notifications::responses::MarkReadResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{internal_error, not_found, require_context};
use crate::storage::Storage;

/// Reply carrying the refreshed badge counter.
async fn marked(
    storage: &Arc<dyn Storage>,
    user_id: i64,
    marked_count: u64,
    message: &str,
) -> HttpResponse {
    let unread_count = storage
        .count_unread_notifications(user_id)
        .await
        .unwrap_or_default();
    HttpResponse::Ok().json(ApiResponse::success(
        MarkReadResponse {
            marked_count,
            unread_count,
        },
        message,
    ))
}

pub async fn mark_read(
    service: &NotificationService,
    request: &HttpRequest,
    notification_id: i64,
) -> ActixResult<HttpResponse> {
    let ctx = match require_context(request) {
        Ok(ctx) => ctx,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    // Someone else's notification reads as missing.
    match storage
        .mark_notification_read(ctx.user_id(), notification_id)
        .await
    {
        Ok(Some(changed)) => Ok(marked(
            &storage,
            ctx.user_id(),
            u64::from(changed),
            "Notificación leída",
        )
        .await),
        Ok(None) => Ok(not_found(
            ErrorCode::NotificationNotFound,
            "Notificación no encontrada",
        )),
        Err(e) => Ok(internal_error(format!(
            "Error actualizando la notificación: {e}"
        ))),
    }
}

pub async fn mark_all_read(
    service: &NotificationService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let ctx = match require_context(request) {
        Ok(ctx) => ctx,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    match storage.mark_all_notifications_read(ctx.user_id()).await {
        Ok(count) => {
            debug!("User {} marked {} notifications as read", ctx.user_id(), count);
            Ok(marked(&storage, ctx.user_id(), count, "Notificaciones leídas").await)
        }
        Err(e) => Ok(internal_error(format!(
            "Error actualizando notificaciones: {e}"
        ))),
    }
}
