use serde::Serialize;
use ts_rs::TS;

use super::entities::Message;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/message.ts")]
pub struct MessagesSentResponse {
    pub mensajes: Vec<Message>,
    pub notificados: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notif_error: Option<String>,
}
