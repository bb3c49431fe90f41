use serde::Deserialize;
use ts_rs::TS;

/// `GET /attendance/course` filters.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct CourseAttendanceQuery {
    pub curso: String,
    pub fecha: Option<String>,
    pub tipo: Option<String>,
}
