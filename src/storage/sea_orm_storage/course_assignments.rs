use super::SeaOrmStorage;
use crate::entity::course_assignments::{ActiveModel, Column, Entity as CourseAssignments, Model};
use crate::errors::{BoletinError, Result};
use crate::models::course_assignments::entities::{AssignmentKind, CourseAssignment};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    async fn find_assignment(
        &self,
        user_id: i64,
        course: &str,
        kind: AssignmentKind,
    ) -> Result<Option<Model>> {
        CourseAssignments::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Course.eq(course))
            .filter(Column::Kind.eq(kind.to_string()))
            .one(&self.db)
            .await
            .map_err(|e| {
                BoletinError::database_operation(format!("Failed to query course assignment: {e}"))
            })
    }

    async fn insert_assignment(
        &self,
        user_id: i64,
        course: &str,
        kind: AssignmentKind,
    ) -> Result<Model> {
        let model = ActiveModel {
            user_id: Set(user_id),
            course: Set(course.to_string()),
            kind: Set(kind.to_string()),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        model.insert(&self.db).await.map_err(|e| {
            BoletinError::database_operation(format!("Failed to create course assignment: {e}"))
        })
    }

    pub async fn list_course_assignments_impl(
        &self,
        user_id: Option<i64>,
        kind: Option<AssignmentKind>,
    ) -> Result<Vec<CourseAssignment>> {
        let mut condition = Condition::all();
        if let Some(user_id) = user_id {
            condition = condition.add(Column::UserId.eq(user_id));
        }
        if let Some(kind) = kind {
            condition = condition.add(Column::Kind.eq(kind.to_string()));
        }

        let result = CourseAssignments::find()
            .filter(condition)
            .order_by_asc(Column::UserId)
            .order_by_asc(Column::Course)
            .all(&self.db)
            .await
            .map_err(|e| {
                BoletinError::database_operation(format!("Failed to list course assignments: {e}"))
            })?;

        Ok(result
            .into_iter()
            .map(|m| m.into_course_assignment())
            .collect())
    }

    pub async fn create_course_assignment_impl(
        &self,
        user_id: i64,
        course: &str,
        kind: AssignmentKind,
    ) -> Result<CourseAssignment> {
        if self.find_assignment(user_id, course, kind).await?.is_some() {
            return Err(BoletinError::conflict(format!(
                "User {user_id} is already assigned to {course} as {kind}"
            )));
        }

        Ok(self
            .insert_assignment(user_id, course, kind)
            .await?
            .into_course_assignment())
    }

    pub async fn ensure_course_assignment_impl(
        &self,
        user_id: i64,
        course: &str,
        kind: AssignmentKind,
    ) -> Result<bool> {
        if self.find_assignment(user_id, course, kind).await?.is_some() {
            return Ok(false);
        }
        self.insert_assignment(user_id, course, kind).await?;
        Ok(true)
    }

    pub async fn delete_course_assignment_impl(&self, id: i64) -> Result<bool> {
        let result = CourseAssignments::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| {
                BoletinError::database_operation(format!("Failed to delete course assignment: {e}"))
            })?;

        Ok(result.rows_affected > 0)
    }
}
