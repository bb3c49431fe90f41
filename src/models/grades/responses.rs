use serde::Serialize;
use ts_rs::TS;

use super::entities::Grade;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeCreatedResponse {
    pub nota: Grade,
    pub notificados: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notif_error: Option<String>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct BulkGradeError {
    pub index: usize,
    pub detalle: String,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct BulkGradesResponse {
    pub creadas: Vec<Grade>,
    pub errores: Vec<BulkGradeError>,
    pub notificados: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notif_error: Option<String>,
}
