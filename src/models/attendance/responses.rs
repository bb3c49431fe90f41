use chrono::NaiveDate;
use serde::Serialize;
use ts_rs::TS;

use super::entities::{AttendanceRecord, attendance_type_label};
use crate::models::common::PaginationInfo;
use crate::models::students::entities::Student;

/// One attendance row as clients see it.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct AttendanceItem {
    pub id: i64,
    pub alumno_id: i64,
    pub id_alumno: String,
    pub alumno: String,
    pub curso: String,
    pub fecha: NaiveDate,
    pub tipo_asistencia: String,
    pub tipo_label: String,
    pub presente: bool,
    pub tarde: bool,
    pub justificada: bool,
    pub falta_valor: f64,
    pub observacion: Option<String>,
}

impl AttendanceItem {
    pub fn from_record(record: &AttendanceRecord, student: &Student) -> Self {
        Self {
            id: record.id,
            alumno_id: student.id,
            id_alumno: student.enrollment_code.clone(),
            alumno: student.full_name(),
            curso: student.course.clone(),
            fecha: record.date,
            tipo_asistencia: record.attendance_type.clone(),
            tipo_label: attendance_type_label(&record.attendance_type).to_string(),
            presente: record.present,
            tarde: record.late,
            justificada: record.justified,
            falta_valor: record.absence_value(),
            observacion: record.note.clone(),
        }
    }
}

/// Result of one registration call.
///
/// `curso`, `fecha` and `tipo_asistencia` are omitted when an item list
/// spanned several courses, dates or types.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct RegistrationResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curso: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_asistencia: Option<String>,
    pub guardadas: usize,
    pub errores: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<AttendanceItem>>,
    pub notificados: usize,
    /// Fanout failure, only filled in for staff callers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notif_error: Option<String>,
}

/// Counters returned with a 400 when nothing in the batch could be stored.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct RegistrationFailure {
    pub guardadas: usize,
    pub errores: usize,
}

/// State of one record after (or instead of) a justification change.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct JustificationResponse {
    pub id: i64,
    pub alumno_id: i64,
    pub fecha: NaiveDate,
    pub tipo_asistencia: String,
    pub presente: bool,
    pub tarde: bool,
    pub justificada: bool,
    pub falta_valor: f64,
}

impl From<&AttendanceRecord> for JustificationResponse {
    fn from(record: &AttendanceRecord) -> Self {
        Self {
            id: record.id,
            alumno_id: record.student_id,
            fecha: record.date,
            tipo_asistencia: record.attendance_type.clone(),
            presente: record.present,
            tarde: record.late,
            justificada: record.justified,
            falta_valor: record.absence_value(),
        }
    }
}

/// `observacion` and `detalle` carry the same text for older clients.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct NoteResponse {
    pub id: i64,
    pub alumno_id: i64,
    pub fecha: NaiveDate,
    pub tipo_asistencia: String,
    pub presente: bool,
    pub tarde: bool,
    pub justificada: bool,
    pub observacion: String,
    pub detalle: String,
}

impl From<&AttendanceRecord> for NoteResponse {
    fn from(record: &AttendanceRecord) -> Self {
        let note = record.note.clone().unwrap_or_default();
        Self {
            id: record.id,
            alumno_id: record.student_id,
            fecha: record.date,
            tipo_asistencia: record.attendance_type.clone(),
            presente: record.present,
            tarde: record.late,
            justificada: record.justified,
            observacion: note.clone(),
            detalle: note,
        }
    }
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct StudentAttendanceResponse {
    pub alumno_id: i64,
    pub items: Vec<AttendanceItem>,
    pub pagination: PaginationInfo,
    /// Sum of absence-equivalents over every record of the student.
    pub total_faltas: f64,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct CourseAttendanceResponse {
    pub curso: String,
    pub fecha: NaiveDate,
    pub items: Vec<AttendanceItem>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct AttendanceTypeOption {
    pub id: String,
    pub nombre: String,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct AttendanceTypesResponse {
    pub tipos: Vec<AttendanceTypeOption>,
}
