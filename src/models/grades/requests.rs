use serde::Deserialize;
use ts_rs::TS;

/// One grade as sent by clients. Loose fields are validated in the service.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct CreateGradeRequest {
    pub alumno_id: Option<i64>,
    pub id_alumno: Option<String>,
    pub materia: String,
    pub tipo: String,
    /// Number 1..10 or one of the qualitative codes.
    pub calificacion: serde_json::Value,
    pub cuatrimestre: serde_json::Value,
    pub fecha: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct BulkCreateGradesRequest {
    /// Raw items so one malformed entry does not reject the whole batch.
    pub notas: Vec<serde_json::Value>,
}
