use super::SeaOrmStorage;
use crate::entity::grades::{ActiveModel, Entity as Grades};
use crate::errors::{BoletinError, Result};
use crate::models::grades::entities::{Grade, NewGrade};
use sea_orm::{ActiveModelTrait, Set, TransactionTrait};

impl SeaOrmStorage {
    /// All rows or none. Rows are inserted one by one so each id comes back.
    pub async fn create_grades_impl(&self, grades: Vec<NewGrade>) -> Result<Vec<Grade>> {
        if grades.is_empty() {
            return Ok(Vec::new());
        }

        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await.map_err(|e| {
            BoletinError::database_operation(format!("Failed to open grade transaction: {e}"))
        })?;

        let mut created = Vec::with_capacity(grades.len());
        for grade in grades {
            let model = ActiveModel {
                student_id: Set(grade.student_id),
                subject: Set(grade.subject),
                kind: Set(grade.kind.to_string()),
                value: Set(grade.value),
                term: Set(grade.term),
                date: Set(grade.date),
                created_by: Set(grade.created_by),
                created_at: Set(now),
                ..Default::default()
            };

            let result = model.insert(&txn).await.map_err(|e| {
                BoletinError::database_operation(format!("Failed to create grade: {e}"))
            })?;
            created.push(result.into_grade());
        }

        txn.commit().await.map_err(|e| {
            BoletinError::database_operation(format!("Failed to commit grades: {e}"))
        })?;

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grades::entities::GradeKind;
    use crate::models::students::requests::CreateStudentRequest;
    use crate::storage::Storage;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_create_grades_returns_ids() {
        let storage = SeaOrmStorage::in_memory().await.unwrap();
        let student = storage
            .create_student(CreateStudentRequest {
                enrollment_code: "A001".to_string(),
                first_name: "Ana".to_string(),
                last_name: "Gómez".to_string(),
                course: "1A".to_string(),
                parent_user_id: None,
                user_id: None,
            })
            .await
            .unwrap();

        let new_grade = |subject: &str| NewGrade {
            student_id: student.id,
            subject: subject.to_string(),
            kind: GradeKind::Evaluacion,
            value: "8".to_string(),
            term: 1,
            date: NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
            created_by: None,
        };

        let created = storage
            .create_grades(vec![new_grade("Matemática"), new_grade("Historia")])
            .await
            .unwrap();
        assert_eq!(created.len(), 2);
        assert_ne!(created[0].id, created[1].id);
        assert_eq!(created[1].subject, "Historia");
        assert_eq!(created[0].kind, GradeKind::Evaluacion);
    }

    #[tokio::test]
    async fn test_failed_row_rolls_back_batch() {
        let storage = SeaOrmStorage::in_memory().await.unwrap();
        let orphan = NewGrade {
            student_id: 999,
            subject: "Lengua".to_string(),
            kind: GradeKind::Oral,
            value: "TEA".to_string(),
            term: 2,
            date: NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
            created_by: None,
        };
        assert!(storage.create_grades(vec![orphan]).await.is_err());
    }
}
