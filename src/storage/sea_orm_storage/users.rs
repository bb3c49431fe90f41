use super::{SeaOrmStorage, lowercase_in};
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{BoletinError, Result};
use crate::models::users::{entities::User, requests::CreateUserRequest};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

impl SeaOrmStorage {
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            username: Set(req.username.trim().to_string()),
            email: Set(req.email),
            display_name: Set(req.display_name),
            role: Set(req.role.to_string()),
            is_staff: Set(req.is_staff),
            status: Set(req.status.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| BoletinError::database_operation(format!("Failed to create user: {e}")))?;

        Ok(result.into_user())
    }

    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| BoletinError::database_operation(format!("Failed to query user: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    pub async fn get_user_by_username_impl(&self, username: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(|e| BoletinError::database_operation(format!("Failed to query user: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// Case-insensitive.
    pub async fn find_users_by_usernames_impl(&self, usernames: &[String]) -> Result<Vec<User>> {
        let Some(condition) = lowercase_in(Column::Username, usernames) else {
            return Ok(Vec::new());
        };

        let result = Users::find()
            .filter(condition)
            .all(&self.db)
            .await
            .map_err(|e| BoletinError::database_operation(format!("Failed to query users: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_user()).collect())
    }
}
