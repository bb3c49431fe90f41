use serde::Deserialize;
use ts_rs::TS;

use super::entities::AssignmentKind;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course_assignment.ts")]
pub struct CreateAssignmentRequest {
    pub user_id: i64,
    pub curso: String,
    pub kind: AssignmentKind,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course_assignment.ts")]
pub struct AssignmentListQuery {
    pub user_id: Option<String>,
    pub kind: Option<AssignmentKind>,
}
