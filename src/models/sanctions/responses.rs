use serde::Serialize;
use ts_rs::TS;

use super::entities::Sanction;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/sanction.ts")]
pub struct SanctionCreatedResponse {
    pub sancion: Sanction,
    pub notificados: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notif_error: Option<String>,
}
