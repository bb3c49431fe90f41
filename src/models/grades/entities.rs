use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub enum GradeKind {
    Evaluacion,
    Tp,
    Oral,
    Recuperatorio,
}

impl GradeKind {
    pub fn label(&self) -> &'static str {
        match self {
            GradeKind::Evaluacion => "Evaluación",
            GradeKind::Tp => "Trabajo práctico",
            GradeKind::Oral => "Oral",
            GradeKind::Recuperatorio => "Recuperatorio",
        }
    }
}

impl std::fmt::Display for GradeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            GradeKind::Evaluacion => "evaluacion",
            GradeKind::Tp => "tp",
            GradeKind::Oral => "oral",
            GradeKind::Recuperatorio => "recuperatorio",
        };
        write!(f, "{tag}")
    }
}

impl std::str::FromStr for GradeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "evaluacion" | "evaluación" => Ok(GradeKind::Evaluacion),
            "tp" | "trabajo practico" | "trabajo práctico" => Ok(GradeKind::Tp),
            "oral" => Ok(GradeKind::Oral),
            "recuperatorio" => Ok(GradeKind::Recuperatorio),
            _ => Err(format!("Invalid grade kind: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct Grade {
    pub id: i64,
    pub student_id: i64,
    pub subject: String,
    pub kind: GradeKind,
    /// "1".."10", "TEA", "TEP", "TED" or "NO ENTREGADO".
    pub value: String,
    pub term: i16,
    pub date: NaiveDate,
    pub created_by: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Validated grade ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGrade {
    pub student_id: i64,
    pub subject: String,
    pub kind: GradeKind,
    pub value: String,
    pub term: i16,
    pub date: NaiveDate,
    pub created_by: Option<i64>,
}
