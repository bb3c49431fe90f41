use std::sync::Arc;

use chrono::NaiveDate;

use crate::models::{
    attendance::{
        entities::AttendanceRecord,
        plan::{AttendanceBatch, UpsertOutcome},
    },
    course_assignments::entities::{AssignmentKind, CourseAssignment},
    events::entities::{Event, NewEvent},
    grades::entities::{Grade, NewGrade},
    messages::entities::{Message, NewMessage},
    notifications::entities::{Notification, NotificationDraft},
    sanctions::entities::{NewSanction, Sanction},
    students::{
        entities::Student,
        requests::{CreateStudentRequest, LinkStudentAccountsRequest},
    },
    users::{entities::User, requests::CreateUserRequest},
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    // Users
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    /// Case-insensitive.
    async fn find_users_by_usernames(&self, usernames: &[String]) -> Result<Vec<User>>;

    // Students
    async fn create_student(&self, student: CreateStudentRequest) -> Result<Student>;
    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>>;
    async fn get_students_by_ids(&self, ids: &[i64]) -> Result<Vec<Student>>;
    /// Case-insensitive lookup by enrollment code.
    async fn find_students_by_codes(&self, codes: &[String]) -> Result<Vec<Student>>;
    async fn list_students_by_course(&self, course: &str) -> Result<Vec<Student>>;
    async fn link_student_accounts(
        &self,
        id: i64,
        links: LinkStudentAccountsRequest,
    ) -> Result<Option<Student>>;

    // Course assignments
    async fn list_course_assignments(
        &self,
        user_id: Option<i64>,
        kind: Option<AssignmentKind>,
    ) -> Result<Vec<CourseAssignment>>;
    /// Fails with `Conflict` when the (user, course, kind) triple exists.
    async fn create_course_assignment(
        &self,
        user_id: i64,
        course: &str,
        kind: AssignmentKind,
    ) -> Result<CourseAssignment>;
    /// Idempotent variant used by seeding. Returns whether a row was added.
    async fn ensure_course_assignment(
        &self,
        user_id: i64,
        course: &str,
        kind: AssignmentKind,
    ) -> Result<bool>;
    async fn delete_course_assignment(&self, id: i64) -> Result<bool>;

    // Attendance
    /// Fetch, diff and write one batch inside a single transaction.
    async fn upsert_attendance(&self, batch: &AttendanceBatch) -> Result<UpsertOutcome>;
    async fn get_attendance_by_id(&self, id: i64) -> Result<Option<AttendanceRecord>>;
    async fn find_attendance(
        &self,
        student_ids: &[i64],
        date: NaiveDate,
        attendance_type: Option<&str>,
    ) -> Result<Vec<AttendanceRecord>>;
    /// Newest first; returns the page and the total row count.
    async fn list_attendance_by_student(
        &self,
        student_id: i64,
        page: u64,
        size: u64,
    ) -> Result<(Vec<AttendanceRecord>, u64)>;
    async fn student_absence_total(&self, student_id: i64) -> Result<f64>;
    async fn set_attendance_justified(
        &self,
        id: i64,
        justified: bool,
    ) -> Result<Option<AttendanceRecord>>;
    async fn set_attendance_note(
        &self,
        id: i64,
        note: Option<String>,
    ) -> Result<Option<AttendanceRecord>>;

    // Notifications
    /// One bulk insert; returns the number of rows written.
    async fn create_notifications(&self, drafts: Vec<NotificationDraft>) -> Result<usize>;
    async fn list_recent_notifications(
        &self,
        user_id: i64,
        limit: u64,
        unread_only: bool,
    ) -> Result<Vec<Notification>>;
    async fn count_unread_notifications(&self, user_id: i64) -> Result<u64>;
    /// `None` when the notification does not exist or belongs to someone else.
    async fn mark_notification_read(&self, user_id: i64, id: i64) -> Result<Option<bool>>;
    async fn mark_all_notifications_read(&self, user_id: i64) -> Result<u64>;
    async fn purge_read_notifications(&self, created_before: i64) -> Result<u64>;

    // Fanout triggers
    async fn create_grades(&self, grades: Vec<NewGrade>) -> Result<Vec<Grade>>;
    async fn create_sanction(&self, sanction: NewSanction) -> Result<Sanction>;
    async fn create_event(&self, event: NewEvent) -> Result<Event>;
    async fn create_messages(&self, messages: Vec<NewMessage>) -> Result<Vec<Message>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
