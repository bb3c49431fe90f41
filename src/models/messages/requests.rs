use serde::Deserialize;
use ts_rs::TS;

/// Either `receptor_id` (direct message) or a student reference, in which
/// case the student's guardians and own account receive a copy.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/message.ts")]
pub struct SendMessageRequest {
    pub asunto: String,
    pub contenido: String,
    pub receptor_id: Option<i64>,
    pub alumno_id: Option<i64>,
    pub id_alumno: Option<String>,
}
