use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/course_assignment.ts")]
pub enum AssignmentKind {
    Teacher,
    Preceptor,
}

impl std::fmt::Display for AssignmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentKind::Teacher => write!(f, "teacher"),
            AssignmentKind::Preceptor => write!(f, "preceptor"),
        }
    }
}

impl std::str::FromStr for AssignmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "teacher" => Ok(AssignmentKind::Teacher),
            "preceptor" => Ok(AssignmentKind::Preceptor),
            _ => Err(format!("Invalid assignment kind: {s}")),
        }
    }
}

/// "This staff account may act on this course."
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course_assignment.ts")]
pub struct CourseAssignment {
    pub id: i64,
    pub user_id: i64,
    pub course: String,
    pub kind: AssignmentKind,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
