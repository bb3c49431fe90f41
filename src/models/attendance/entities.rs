use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Known attendance types (tag, label). Other tags are accepted and shown as-is.
pub const ATTENDANCE_TYPES: [(&str, &str); 4] = [
    ("clases", "Clases"),
    ("educacion_fisica", "Educación Física"),
    ("informatica", "Informática"),
    ("taller", "Taller"),
];

pub fn attendance_type_label(tag: &str) -> &str {
    ATTENDANCE_TYPES
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, label)| *label)
        .unwrap_or(tag)
}

/// Target state of one student. Construction keeps `late` implying `present`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttendanceStatus {
    present: bool,
    late: bool,
}

impl AttendanceStatus {
    /// An absent student can never be late, so `late` is dropped when
    /// `present` is false.
    pub fn new(present: bool, late: bool) -> Self {
        Self {
            present,
            late: present && late,
        }
    }

    pub fn on_time() -> Self {
        Self::new(true, false)
    }

    pub fn late() -> Self {
        Self::new(true, true)
    }

    pub fn absent() -> Self {
        Self::new(false, false)
    }

    pub fn is_present(&self) -> bool {
        self.present
    }

    pub fn is_late(&self) -> bool {
        self.late
    }

    pub fn is_plain_presence(&self) -> bool {
        self.present && !self.late
    }
}

impl Default for AttendanceStatus {
    fn default() -> Self {
        Self::on_time()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct AttendanceRecord {
    pub id: i64,
    pub student_id: i64,
    pub date: NaiveDate,
    pub attendance_type: String,
    pub present: bool,
    pub late: bool,
    pub justified: bool,
    pub note: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl AttendanceRecord {
    pub fn status(&self) -> AttendanceStatus {
        AttendanceStatus::new(self.present, self.late)
    }

    /// On time and present: nothing to justify or annotate.
    pub fn is_plain_presence(&self) -> bool {
        self.present && !self.late
    }

    /// Absence-equivalent: justified 0, absent 1, late 0.5, present 0.
    pub fn absence_value(&self) -> f64 {
        if self.justified {
            0.0
        } else if !self.present {
            1.0
        } else if self.late {
            0.5
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(present: bool, late: bool, justified: bool) -> AttendanceRecord {
        AttendanceRecord {
            id: 1,
            student_id: 1,
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            attendance_type: "clases".to_string(),
            present,
            late,
            justified,
            note: None,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_forces_late_off_when_absent() {
        let status = AttendanceStatus::new(false, true);
        assert!(!status.is_present());
        assert!(!status.is_late());
        assert!(AttendanceStatus::late().is_present());
    }

    #[test]
    fn test_absence_value_weights() {
        assert_eq!(record(false, false, false).absence_value(), 1.0);
        assert_eq!(record(true, true, false).absence_value(), 0.5);
        assert_eq!(record(true, false, false).absence_value(), 0.0);
        assert_eq!(record(false, false, true).absence_value(), 0.0);
        assert_eq!(record(true, true, true).absence_value(), 0.0);
    }

    #[test]
    fn test_type_labels() {
        assert_eq!(attendance_type_label("informatica"), "Informática");
        assert_eq!(attendance_type_label("coro"), "coro");
    }
}
