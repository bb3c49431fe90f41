use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/sanction.ts")]
pub struct CreateSanctionRequest {
    pub alumno_id: Option<i64>,
    pub id_alumno: Option<String>,
    pub fecha: Option<String>,
    pub tipo: Option<String>,
    #[serde(alias = "asunto")]
    pub motivo: String,
    #[serde(alias = "mensaje")]
    pub detalle: Option<String>,
    pub docente: Option<String>,
}
