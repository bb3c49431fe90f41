use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/message.ts")]
pub struct Message {
    pub id: i64,
    pub sender_id: i64,
    pub recipient_id: i64,
    pub student_id: Option<i64>,
    pub course: Option<String>,
    pub subject: String,
    pub content: String,
    pub is_read: bool,
    pub sent_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub sender_id: i64,
    pub recipient_id: i64,
    pub student_id: Option<i64>,
    pub course: Option<String>,
    pub subject: String,
    pub content: String,
}
