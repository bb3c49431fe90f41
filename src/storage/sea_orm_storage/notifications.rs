use super::SeaOrmStorage;
use crate::entity::notifications::{ActiveModel, Column, Entity as Notifications};
use crate::errors::{BoletinError, Result};
use crate::models::notifications::entities::{Notification, NotificationDraft};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

impl SeaOrmStorage {
    /// Writes every draft with a single `INSERT`.
    pub async fn create_notifications_impl(&self, drafts: Vec<NotificationDraft>) -> Result<usize> {
        if drafts.is_empty() {
            return Ok(0);
        }

        let now = chrono::Utc::now().timestamp();
        let count = drafts.len();
        let models = drafts.into_iter().map(|draft| ActiveModel {
            recipient_id: Set(draft.recipient_id),
            category: Set(draft.category.as_str().to_string()),
            title: Set(draft.title),
            description: Set(draft.description),
            url: Set(draft.url),
            meta: Set(draft.meta.to_string()),
            is_read: Set(false),
            created_at: Set(now),
            ..Default::default()
        });

        Notifications::insert_many(models)
            .exec(&self.db)
            .await
            .map_err(|e| {
                BoletinError::database_operation(format!("Failed to create notifications: {e}"))
            })?;

        Ok(count)
    }

    pub async fn list_recent_notifications_impl(
        &self,
        user_id: i64,
        limit: u64,
        unread_only: bool,
    ) -> Result<Vec<Notification>> {
        let mut select = Notifications::find().filter(Column::RecipientId.eq(user_id));
        if unread_only {
            select = select.filter(Column::IsRead.eq(false));
        }

        let result = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| {
                BoletinError::database_operation(format!("Failed to list notifications: {e}"))
            })?;

        Ok(result.into_iter().map(|m| m.into_notification()).collect())
    }

    pub async fn count_unread_notifications_impl(&self, user_id: i64) -> Result<u64> {
        Notifications::find()
            .filter(Column::RecipientId.eq(user_id))
            .filter(Column::IsRead.eq(false))
            .count(&self.db)
            .await
            .map_err(|e| {
                BoletinError::database_operation(format!("Failed to count notifications: {e}"))
            })
    }

    /// `Some(true)` when the row flipped to read, `Some(false)` when it was
    /// already read.
    pub async fn mark_notification_read_impl(&self, user_id: i64, id: i64) -> Result<Option<bool>> {
        let existing = Notifications::find_by_id(id)
            .filter(Column::RecipientId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| {
                BoletinError::database_operation(format!("Failed to query notification: {e}"))
            })?;

        let Some(existing) = existing else {
            return Ok(None);
        };
        if existing.is_read {
            return Ok(Some(false));
        }

        let mut model: ActiveModel = existing.into();
        model.is_read = Set(true);
        model.update(&self.db).await.map_err(|e| {
            BoletinError::database_operation(format!("Failed to mark notification: {e}"))
        })?;

        Ok(Some(true))
    }

    pub async fn mark_all_notifications_read_impl(&self, user_id: i64) -> Result<u64> {
        let result = Notifications::update_many()
            .col_expr(Column::IsRead, Expr::value(true))
            .filter(Column::RecipientId.eq(user_id))
            .filter(Column::IsRead.eq(false))
            .exec(&self.db)
            .await
            .map_err(|e| {
                BoletinError::database_operation(format!("Failed to mark notifications: {e}"))
            })?;

        Ok(result.rows_affected)
    }

    /// Drops read notifications created before the given unix timestamp.
    pub async fn purge_read_notifications_impl(&self, created_before: i64) -> Result<u64> {
        let result = Notifications::delete_many()
            .filter(Column::IsRead.eq(true))
            .filter(Column::CreatedAt.lt(created_before))
            .exec(&self.db)
            .await
            .map_err(|e| {
                BoletinError::database_operation(format!("Failed to purge notifications: {e}"))
            })?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notifications::entities::NotificationCategory;
    use crate::models::users::{entities::UserRole, requests::CreateUserRequest};
    use crate::storage::Storage;

    fn draft(recipient_id: i64, title: &str) -> NotificationDraft {
        NotificationDraft {
            recipient_id,
            category: NotificationCategory::Absence,
            title: title.to_string(),
            description: "Inasistencia".to_string(),
            url: Some("/alumnos/1/?tab=asistencias".to_string()),
            meta: serde_json::json!({ "alumno_id": 1 }),
        }
    }

    async fn setup() -> (SeaOrmStorage, i64, i64) {
        let storage = SeaOrmStorage::in_memory().await.unwrap();
        let parent = storage
            .create_user(CreateUserRequest::new("padre", UserRole::Parent))
            .await
            .unwrap();
        let other = storage
            .create_user(CreateUserRequest::new("otro", UserRole::Parent))
            .await
            .unwrap();
        (storage, parent.id, other.id)
    }

    #[tokio::test]
    async fn test_bulk_create_and_unread_count() {
        let (storage, parent, other) = setup().await;
        let written = storage
            .create_notifications(vec![draft(parent, "a"), draft(parent, "b"), draft(other, "c")])
            .await
            .unwrap();
        assert_eq!(written, 3);
        assert_eq!(storage.count_unread_notifications(parent).await.unwrap(), 2);

        let recent = storage
            .list_recent_notifications(parent, 1, false)
            .await
            .unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].title, "b");
        assert_eq!(recent[0].meta["alumno_id"], 1);
    }

    #[tokio::test]
    async fn test_mark_read_is_scoped_to_recipient() {
        let (storage, parent, other) = setup().await;
        storage
            .create_notifications(vec![draft(parent, "a")])
            .await
            .unwrap();
        let id = storage
            .list_recent_notifications(parent, 5, false)
            .await
            .unwrap()[0]
            .id;

        assert_eq!(storage.mark_notification_read(other, id).await.unwrap(), None);
        assert_eq!(storage.mark_notification_read(parent, id).await.unwrap(), Some(true));
        assert_eq!(storage.mark_notification_read(parent, id).await.unwrap(), Some(false));
        assert!(
            storage
                .list_recent_notifications(parent, 5, true)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_mark_all_and_purge() {
        let (storage, parent, _) = setup().await;
        storage
            .create_notifications(vec![draft(parent, "a"), draft(parent, "b")])
            .await
            .unwrap();

        assert_eq!(storage.mark_all_notifications_read(parent).await.unwrap(), 2);
        assert_eq!(storage.mark_all_notifications_read(parent).await.unwrap(), 0);

        let future = chrono::Utc::now().timestamp() + 60;
        assert_eq!(storage.purge_read_notifications(future).await.unwrap(), 2);
        assert_eq!(storage.count_unread_notifications(parent).await.unwrap(), 0);
    }
}
