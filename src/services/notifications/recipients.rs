//! Who gets notified about a student.

use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::Result;
use crate::models::students::entities::Student;
use crate::models::users::entities::User;
use crate::storage::Storage;

/// Parent, self account, then the account whose username is the enrollment
/// code. Duplicates keep their first position.
pub fn resolve_recipients(student: &Student, users_by_username: &HashMap<String, i64>) -> Vec<i64> {
    let by_code = users_by_username
        .get(&student.enrollment_code.trim().to_lowercase())
        .copied();

    let mut recipients = Vec::with_capacity(3);
    for id in [student.parent_user_id, student.user_id, by_code]
        .into_iter()
        .flatten()
    {
        if !recipients.contains(&id) {
            recipients.push(id);
        }
    }
    recipients
}

/// Lowercased username -> user id.
pub fn index_usernames(users: &[User]) -> HashMap<String, i64> {
    users
        .iter()
        .map(|user| (user.username.to_lowercase(), user.id))
        .collect()
}

/// Recipients of every student, resolved with one username lookup.
pub async fn recipients_for_students(
    storage: &Arc<dyn Storage>,
    students: &[Student],
) -> Result<HashMap<i64, Vec<i64>>> {
    let codes: Vec<String> = students
        .iter()
        .map(|s| s.enrollment_code.clone())
        .collect();
    let users = storage.find_users_by_usernames(&codes).await?;
    let index = index_usernames(&users);

    Ok(students
        .iter()
        .map(|student| (student.id, resolve_recipients(student, &index)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::models::users::requests::CreateUserRequest;
    use crate::models::students::requests::CreateStudentRequest;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    fn student(parent: Option<i64>, user: Option<i64>, code: &str) -> Student {
        Student {
            id: 1,
            enrollment_code: code.to_string(),
            first_name: "Ana".to_string(),
            last_name: "Paz".to_string(),
            course: "1A".to_string(),
            parent_user_id: parent,
            user_id: user,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_recipients_are_deduplicated_in_order() {
        let index = HashMap::from([("leg01".to_string(), 7)]);
        assert_eq!(resolve_recipients(&student(Some(3), Some(7), "LEG01"), &index), vec![3, 7]);
        assert_eq!(resolve_recipients(&student(Some(7), Some(7), "Leg01"), &index), vec![7]);
        assert_eq!(resolve_recipients(&student(None, None, "LEG01"), &index), vec![7]);
        assert!(resolve_recipients(&student(None, None, "otro"), &index).is_empty());
    }

    #[tokio::test]
    async fn test_username_matching_ignores_case() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::in_memory().await.unwrap());
        let parent = storage
            .create_user(CreateUserRequest::new("padre", UserRole::Parent))
            .await
            .unwrap();
        let own = storage
            .create_user(CreateUserRequest::new("leg01", UserRole::Student))
            .await
            .unwrap();
        let student = storage
            .create_student(CreateStudentRequest {
                enrollment_code: "LEG01".to_string(),
                first_name: "Ana".to_string(),
                last_name: "Paz".to_string(),
                course: "1A".to_string(),
                parent_user_id: Some(parent.id),
                user_id: None,
            })
            .await
            .unwrap();

        let recipients = recipients_for_students(&storage, &[student.clone()])
            .await
            .unwrap();
        assert_eq!(recipients[&student.id], vec![parent.id, own.id]);
    }

    #[tokio::test]
    async fn test_mixed_case_username_and_code_resolve() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::in_memory().await.unwrap());
        let own = storage
            .create_user(CreateUserRequest::new("Leg02", UserRole::Student))
            .await
            .unwrap();
        let student = storage
            .create_student(CreateStudentRequest {
                enrollment_code: "lEG02".to_string(),
                first_name: "Bruno".to_string(),
                last_name: "Diaz".to_string(),
                course: "1A".to_string(),
                parent_user_id: None,
                user_id: None,
            })
            .await
            .unwrap();

        let recipients = recipients_for_students(&storage, &[student.clone()])
            .await
            .unwrap();
        assert_eq!(recipients[&student.id], vec![own.id]);
    }
}
