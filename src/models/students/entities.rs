use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct Student {
    pub id: i64,
    /// Enrollment code ("legajo"), unique, compared case-insensitively.
    pub enrollment_code: String,
    pub first_name: String,
    pub last_name: String,
    pub course: String,
    pub parent_user_id: Option<i64>,
    pub user_id: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// "Apellido Nombre", the form used in notification texts.
    pub fn listing_name(&self) -> String {
        let name = format!("{} {}", self.last_name.trim(), self.first_name.trim());
        let name = name.trim();
        if !name.is_empty() {
            name.to_string()
        } else if !self.enrollment_code.trim().is_empty() {
            self.enrollment_code.trim().to_string()
        } else {
            "Alumno".to_string()
        }
    }
}
