use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "messages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub sender_id: i64,
    pub recipient_id: i64,
    pub student_id: Option<i64>,
    pub course: Option<String>,
    pub subject: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub is_read: bool,
    pub sent_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_message(self) -> crate::models::messages::entities::Message {
        use crate::models::messages::entities::Message;
        use chrono::{DateTime, Utc};

        Message {
            id: self.id,
            sender_id: self.sender_id,
            recipient_id: self.recipient_id,
            student_id: self.student_id,
            course: self.course,
            subject: self.subject,
            content: self.content,
            is_read: self.is_read,
            sent_at: DateTime::<Utc>::from_timestamp(self.sent_at, 0).unwrap_or_default(),
        }
    }
}
