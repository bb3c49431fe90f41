use serde::Serialize;
use ts_rs::TS;

use super::entities::Event;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/event.ts")]
pub struct EventCreatedResponse {
    pub evento: Event,
    pub notificados: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notif_error: Option<String>,
}
