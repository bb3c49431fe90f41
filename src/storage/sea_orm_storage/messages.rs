use super::SeaOrmStorage;
use crate::entity::messages::ActiveModel;
use crate::errors::{BoletinError, Result};
use crate::models::messages::entities::{Message, NewMessage};
use sea_orm::{ActiveModelTrait, Set, TransactionTrait};

impl SeaOrmStorage {
    /// One message per recipient, written together.
    pub async fn create_messages_impl(&self, messages: Vec<NewMessage>) -> Result<Vec<Message>> {
        if messages.is_empty() {
            return Ok(Vec::new());
        }

        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await.map_err(|e| {
            BoletinError::database_operation(format!("Failed to open message transaction: {e}"))
        })?;

        let mut sent = Vec::with_capacity(messages.len());
        for message in messages {
            let model = ActiveModel {
                sender_id: Set(message.sender_id),
                recipient_id: Set(message.recipient_id),
                student_id: Set(message.student_id),
                course: Set(message.course),
                subject: Set(message.subject),
                content: Set(message.content),
                is_read: Set(false),
                sent_at: Set(now),
                ..Default::default()
            };

            let result = model.insert(&txn).await.map_err(|e| {
                BoletinError::database_operation(format!("Failed to create message: {e}"))
            })?;
            sent.push(result.into_message());
        }

        txn.commit().await.map_err(|e| {
            BoletinError::database_operation(format!("Failed to commit messages: {e}"))
        })?;

        Ok(sent)
    }
}
