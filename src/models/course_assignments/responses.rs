use serde::Serialize;
use ts_rs::TS;

use super::entities::CourseAssignment;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course_assignment.ts")]
pub struct AssignmentListResponse {
    pub items: Vec<CourseAssignment>,
}
