use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/notification.ts")]
pub enum NotificationCategory {
    #[serde(rename = "nota")]
    Grade,
    #[serde(rename = "sancion")]
    Sanction,
    #[serde(rename = "inasistencia")]
    Absence,
    #[serde(rename = "mensaje")]
    Message,
    #[serde(rename = "evento")]
    Event,
    #[serde(rename = "otro")]
    Other,
}

impl NotificationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationCategory::Grade => "nota",
            NotificationCategory::Sanction => "sancion",
            NotificationCategory::Absence => "inasistencia",
            NotificationCategory::Message => "mensaje",
            NotificationCategory::Event => "evento",
            NotificationCategory::Other => "otro",
        }
    }

    /// Meta key listing the triggering record ids.
    pub fn ids_key(&self) -> &'static str {
        match self {
            NotificationCategory::Grade => "nota_ids",
            NotificationCategory::Sanction => "sancion_ids",
            NotificationCategory::Absence => "asistencia_ids",
            NotificationCategory::Message => "mensaje_ids",
            NotificationCategory::Event => "evento_ids",
            NotificationCategory::Other => "record_ids",
        }
    }
}

impl std::fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NotificationCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nota" => Ok(NotificationCategory::Grade),
            "sancion" => Ok(NotificationCategory::Sanction),
            "inasistencia" => Ok(NotificationCategory::Absence),
            "mensaje" => Ok(NotificationCategory::Message),
            "evento" => Ok(NotificationCategory::Event),
            "otro" => Ok(NotificationCategory::Other),
            _ => Err(format!("Invalid notification category: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/notification.ts")]
pub struct Notification {
    pub id: i64,
    pub recipient_id: i64,
    #[serde(rename = "tipo")]
    pub category: NotificationCategory,
    pub title: String,
    pub description: String,
    pub url: Option<String>,
    /// Primitive identifiers only (student id, record ids, course).
    pub meta: serde_json::Value,
    #[serde(rename = "leida")]
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A notification built in memory, not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationDraft {
    pub recipient_id: i64,
    pub category: NotificationCategory,
    pub title: String,
    pub description: String,
    pub url: Option<String>,
    pub meta: serde_json::Value,
}
