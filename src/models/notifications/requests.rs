use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/notification.ts")]
pub struct RecentNotificationsQuery {
    pub limit: Option<String>,
    /// Truthy values ("1", "true", "si") restrict the list to unread rows.
    pub solo_no_leidas: Option<String>,
}
