use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/event.ts")]
pub struct CreateEventRequest {
    pub titulo: String,
    pub descripcion: Option<String>,
    pub fecha: String,
    pub curso: String,
    pub tipo_evento: Option<String>,
}
