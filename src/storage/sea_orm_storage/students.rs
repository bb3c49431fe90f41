use super::{SeaOrmStorage, lowercase_in};
use crate::entity::students::{ActiveModel, Column, Entity as Students};
use crate::errors::{BoletinError, Result};
use crate::models::courses::entities::normalize_course;
use crate::utils::validate::validate_enrollment_code;
use crate::models::students::{
    entities::Student,
    requests::{CreateStudentRequest, LinkStudentAccountsRequest},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
};

impl SeaOrmStorage {
    pub async fn create_student_impl(&self, req: CreateStudentRequest) -> Result<Student> {
        let course = normalize_course(&req.course).ok_or_else(|| {
            BoletinError::validation(format!("Unknown course: {}", req.course))
        })?;
        let code = req.enrollment_code.trim().to_string();
        validate_enrollment_code(&code).map_err(BoletinError::validation)?;
        if !self.find_students_by_codes_impl(std::slice::from_ref(&code)).await?.is_empty() {
            return Err(BoletinError::conflict(format!(
                "Enrollment code already exists: {code}"
            )));
        }

        let now = chrono::Utc::now().timestamp();
        let model = ActiveModel {
            enrollment_code: Set(code),
            first_name: Set(req.first_name.trim().to_string()),
            last_name: Set(req.last_name.trim().to_string()),
            course: Set(course.to_string()),
            parent_user_id: Set(req.parent_user_id),
            user_id: Set(req.user_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                BoletinError::conflict(format!("Enrollment code already exists: {e}"))
            }
            _ => BoletinError::database_operation(format!("Failed to create student: {e}")),
        })?;

        Ok(result.into_student())
    }

    pub async fn get_student_by_id_impl(&self, id: i64) -> Result<Option<Student>> {
        let result = Students::find_by_id(id).one(&self.db).await.map_err(|e| {
            BoletinError::database_operation(format!("Failed to query student: {e}"))
        })?;

        Ok(result.map(|m| m.into_student()))
    }

    pub async fn get_students_by_ids_impl(&self, ids: &[i64]) -> Result<Vec<Student>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = Students::find()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(|e| {
                BoletinError::database_operation(format!("Failed to query students: {e}"))
            })?;

        Ok(result.into_iter().map(|m| m.into_student()).collect())
    }

    pub async fn find_students_by_codes_impl(&self, codes: &[String]) -> Result<Vec<Student>> {
        let Some(condition) = lowercase_in(Column::EnrollmentCode, codes) else {
            return Ok(Vec::new());
        };

        let result = Students::find()
            .filter(condition)
            .all(&self.db)
            .await
            .map_err(|e| {
                BoletinError::database_operation(format!("Failed to query students: {e}"))
            })?;

        Ok(result.into_iter().map(|m| m.into_student()).collect())
    }

    pub async fn list_students_by_course_impl(&self, course: &str) -> Result<Vec<Student>> {
        let result = Students::find()
            .filter(Column::Course.eq(course))
            .order_by_asc(Column::LastName)
            .order_by_asc(Column::FirstName)
            .all(&self.db)
            .await
            .map_err(|e| {
                BoletinError::database_operation(format!("Failed to list course students: {e}"))
            })?;

        Ok(result.into_iter().map(|m| m.into_student()).collect())
    }

    pub async fn link_student_accounts_impl(
        &self,
        id: i64,
        links: LinkStudentAccountsRequest,
    ) -> Result<Option<Student>> {
        let Some(existing) = Students::find_by_id(id).one(&self.db).await.map_err(|e| {
            BoletinError::database_operation(format!("Failed to query student: {e}"))
        })?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        if let Some(parent) = links.parent_user_id {
            model.parent_user_id = Set(parent);
        }
        if let Some(account) = links.user_id {
            model.user_id = Set(account);
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let result = model.update(&self.db).await.map_err(|e| {
            BoletinError::database_operation(format!("Failed to link student accounts: {e}"))
        })?;

        Ok(Some(result.into_student()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(code: &str) -> CreateStudentRequest {
        CreateStudentRequest {
            enrollment_code: code.to_string(),
            first_name: "Ana".to_string(),
            last_name: "Paz".to_string(),
            course: "3B".to_string(),
            parent_user_id: None,
            user_id: None,
        }
    }

    #[tokio::test]
    async fn test_code_lookup_matches_mixed_case_storage() {
        let storage = SeaOrmStorage::in_memory().await.unwrap();
        let stored = storage.create_student_impl(request("Leg01")).await.unwrap();

        for wanted in ["LEG01", "leg01", " lEg01 "] {
            let found = storage
                .find_students_by_codes_impl(&[wanted.to_string()])
                .await
                .unwrap();
            assert_eq!(found.len(), 1, "lookup {wanted:?}");
            assert_eq!(found[0].id, stored.id);
        }
        assert!(storage.find_students_by_codes_impl(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_codes_differing_only_in_case_conflict() {
        let storage = SeaOrmStorage::in_memory().await.unwrap();
        storage.create_student_impl(request("Leg01")).await.unwrap();

        let err = storage.create_student_impl(request("LEG01")).await.unwrap_err();
        assert!(matches!(err, BoletinError::Conflict(_)));

        // The lower(enrollment_code) index rejects it even without the lookup.
        let now = chrono::Utc::now().timestamp();
        let direct = ActiveModel {
            enrollment_code: Set("LEG01".to_string()),
            first_name: Set("Otra".to_string()),
            last_name: Set("Paz".to_string()),
            course: Set("3B".to_string()),
            parent_user_id: Set(None),
            user_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        assert!(direct.insert(&storage.db).await.is_err());
    }
}
