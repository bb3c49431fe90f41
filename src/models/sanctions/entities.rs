use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/sanction.ts")]
pub struct Sanction {
    pub id: i64,
    pub student_id: i64,
    pub date: NaiveDate,
    /// Free text kind, "Amonestación" by default.
    pub kind: String,
    pub reason: String,
    pub detail: Option<String>,
    pub teacher_label: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSanction {
    pub student_id: i64,
    pub date: NaiveDate,
    pub kind: String,
    pub reason: String,
    pub detail: Option<String>,
    pub teacher_label: Option<String>,
    pub created_by: Option<i64>,
}
