use serde::Serialize;
use ts_rs::TS;

use super::entities::Course;

/// Courses the caller may register attendance for.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct MyCoursesResponse {
    #[serde(rename = "cursos")]
    pub courses: Vec<Course>,
    /// True when the caller is not restricted to an assignment list.
    #[serde(rename = "sin_restriccion")]
    pub unrestricted: bool,
}
