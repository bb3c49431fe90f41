use super::SeaOrmStorage;
use crate::entity::sanctions::ActiveModel;
use crate::errors::{BoletinError, Result};
use crate::models::sanctions::entities::{NewSanction, Sanction};
use sea_orm::{ActiveModelTrait, Set};

impl SeaOrmStorage {
    pub async fn create_sanction_impl(&self, sanction: NewSanction) -> Result<Sanction> {
        let model = ActiveModel {
            student_id: Set(sanction.student_id),
            date: Set(sanction.date),
            kind: Set(sanction.kind),
            reason: Set(sanction.reason),
            detail: Set(sanction.detail),
            teacher_label: Set(sanction.teacher_label),
            created_by: Set(sanction.created_by),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            BoletinError::database_operation(format!("Failed to create sanction: {e}"))
        })?;

        Ok(result.into_sanction())
    }
}
