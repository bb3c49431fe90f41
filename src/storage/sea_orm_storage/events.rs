use super::SeaOrmStorage;
use crate::entity::events::ActiveModel;
use crate::errors::{BoletinError, Result};
use crate::models::events::entities::{Event, NewEvent};
use sea_orm::{ActiveModelTrait, Set};

impl SeaOrmStorage {
    pub async fn create_event_impl(&self, event: NewEvent) -> Result<Event> {
        let model = ActiveModel {
            title: Set(event.title),
            description: Set(event.description),
            date: Set(event.date),
            course: Set(event.course),
            kind: Set(event.kind.to_string()),
            created_by: Set(event.created_by),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            BoletinError::database_operation(format!("Failed to create event: {e}"))
        })?;

        Ok(result.into_event())
    }
}
