use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::NotificationService;
use crate::config::AppConfig;
use crate::models::notifications::requests::RecentNotificationsQuery;
use crate::models::notifications::responses::NotificationListResponse;
use crate::models::ApiResponse;
use crate::services::{internal_error, require_context};
use crate::utils::text::parse_bool_word;

/// Invalid or non-positive limits fall back to the default; large ones are
/// clamped.
pub(crate) fn effective_limit(raw: Option<&str>, default: u64, max: u64) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|limit| *limit > 0)
        .unwrap_or(default)
        .min(max)
}

pub async fn list_recent(
    service: &NotificationService,
    request: &HttpRequest,
    query: RecentNotificationsQuery,
) -> ActixResult<HttpResponse> {
    let ctx = match require_context(request) {
        Ok(ctx) => ctx,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);
    let config = &AppConfig::get().notifications;

    let limit = effective_limit(
        query.limit.as_deref(),
        config.recent_default_limit,
        config.recent_max_limit,
    );
    let unread_only = query
        .solo_no_leidas
        .as_deref()
        .and_then(parse_bool_word)
        .unwrap_or(false);

    let items = match storage
        .list_recent_notifications(ctx.user_id(), limit, unread_only)
        .await
    {
        Ok(items) => items,
        Err(e) => return Ok(internal_error(format!("Error consultando notificaciones: {e}"))),
    };
    let unread_count = storage
        .count_unread_notifications(ctx.user_id())
        .await
        .unwrap_or_default();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        NotificationListResponse {
            has_more: items.len() as u64 == limit,
            items,
            unread_count,
        },
        "OK",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_limit() {
        assert_eq!(effective_limit(None, 5, 12), 5);
        assert_eq!(effective_limit(Some("8"), 5, 12), 8);
        assert_eq!(effective_limit(Some("50"), 5, 12), 12);
        assert_eq!(effective_limit(Some("0"), 5, 12), 5);
        assert_eq!(effective_limit(Some("muchas"), 5, 12), 5);
    }
}
