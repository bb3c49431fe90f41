use serde::Serialize;
use ts_rs::TS;

use super::entities::Notification;

/// Dropdown payload: newest first, plus the badge counter so the client
/// needs one round trip.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/notification.ts")]
pub struct NotificationListResponse {
    pub items: Vec<Notification>,
    pub unread_count: u64,
    /// True when `items` holds `limit` rows and older ones may exist.
    pub has_more: bool,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/notification.ts")]
pub struct UnreadCountResponse {
    pub unread_count: u64,
}

/// Rows that went from unread to read. Zero when they were already read.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/notification.ts")]
pub struct MarkReadResponse {
    pub marked_count: u64,
    pub unread_count: u64,
}
