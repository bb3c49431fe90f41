//! SeaORM backed storage for SQLite, PostgreSQL and MySQL.

mod attendance;
mod course_assignments;
mod events;
mod grades;
mod messages;
mod notifications;
mod sanctions;
mod students;
mod users;

use crate::config::AppConfig;
use crate::errors::{BoletinError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::sea_query::{Expr, ExprTrait, Func, IntoColumnRef};
use sea_orm::{Condition, ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// `lower(column) IN (...)` over the trimmed, lowercased values, so lookups
/// ignore case on every backend. `None` when nothing is left to match.
pub(crate) fn lowercase_in<C: IntoColumnRef>(column: C, values: &[String]) -> Option<Condition> {
    let mut lowered: Vec<String> = values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect();
    lowered.sort();
    lowered.dedup();
    if lowered.is_empty() {
        return None;
    }
    Some(Condition::all().add(Expr::expr(Func::lower(Expr::col(column))).is_in(lowered)))
}

#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// Connects with the configured URL and runs pending migrations.
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        let storage = Self::from_connection(db).await?;
        info!("SeaORM storage ready, database: {}", db_url);
        Ok(storage)
    }

    /// Wraps an existing connection, migrating it first.
    pub async fn from_connection(db: DatabaseConnection) -> Result<Self> {
        Migrator::up(&db, None)
            .await
            .map_err(|e| BoletinError::database_operation(format!("Migration failed: {e}")))?;
        Ok(Self { db })
    }

    /// Private in-memory SQLite database, used by tests and local tooling.
    ///
    /// The pool is pinned to one connection that never expires, otherwise each
    /// new connection would see an empty database.
    pub async fn in_memory() -> Result<Self> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| BoletinError::database_config(format!("Invalid SQLite URL: {e}")))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opt)
            .await
            .map_err(|e| {
                BoletinError::database_connection(format!("SQLite connection failed: {e}"))
            })?;

        Self::from_connection(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool)).await
    }

    /// SQLite with WAL and tuned pragmas.
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| BoletinError::database_config(format!("Invalid SQLite URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| {
                BoletinError::database_connection(format!("SQLite connection failed: {e}"))
            })?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| BoletinError::database_connection(format!("Cannot connect to database: {e}")))
    }

    /// Infers the backend from the URL; bare `.db`/`.sqlite` paths become SQLite URLs.
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(BoletinError::database_config(format!(
                "Cannot infer database type from URL: {url}. Supported: sqlite://, postgres://, mysql://, or a .db/.sqlite path"
            )))
        }
    }
}

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
use crate::storage::Storage;
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
impl Storage for SeaOrmStorage {
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn find_users_by_usernames(&self, usernames: &[String]) -> Result<Vec<User>> {
        self.find_users_by_usernames_impl(usernames).await
    }

    async fn create_student(&self, student: CreateStudentRequest) -> Result<Student> {
        self.create_student_impl(student).await
    }

    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>> {
        self.get_student_by_id_impl(id).await
    }

    async fn get_students_by_ids(&self, ids: &[i64]) -> Result<Vec<Student>> {
        self.get_students_by_ids_impl(ids).await
    }

    async fn find_students_by_codes(&self, codes: &[String]) -> Result<Vec<Student>> {
        self.find_students_by_codes_impl(codes).await
    }

    async fn list_students_by_course(&self, course: &str) -> Result<Vec<Student>> {
        self.list_students_by_course_impl(course).await
    }

    async fn link_student_accounts(
        &self,
        id: i64,
        links: LinkStudentAccountsRequest,
    ) -> Result<Option<Student>> {
        self.link_student_accounts_impl(id, links).await
    }

    async fn list_course_assignments(
        &self,
        user_id: Option<i64>,
        kind: Option<AssignmentKind>,
    ) -> Result<Vec<CourseAssignment>> {
        self.list_course_assignments_impl(user_id, kind).await
    }

    async fn create_course_assignment(
        &self,
        user_id: i64,
        course: &str,
        kind: AssignmentKind,
    ) -> Result<CourseAssignment> {
        self.create_course_assignment_impl(user_id, course, kind)
            .await
    }

    async fn ensure_course_assignment(
        &self,
        user_id: i64,
        course: &str,
        kind: AssignmentKind,
    ) -> Result<bool> {
        self.ensure_course_assignment_impl(user_id, course, kind)
            .await
    }

    async fn delete_course_assignment(&self, id: i64) -> Result<bool> {
        self.delete_course_assignment_impl(id).await
    }

    async fn upsert_attendance(&self, batch: &AttendanceBatch) -> Result<UpsertOutcome> {
        self.upsert_attendance_impl(batch).await
    }

    async fn get_attendance_by_id(&self, id: i64) -> Result<Option<AttendanceRecord>> {
        self.get_attendance_by_id_impl(id).await
    }

    async fn find_attendance(
        &self,
        student_ids: &[i64],
        date: NaiveDate,
        attendance_type: Option<&str>,
    ) -> Result<Vec<AttendanceRecord>> {
        self.find_attendance_impl(student_ids, date, attendance_type)
            .await
    }

    async fn list_attendance_by_student(
        &self,
        student_id: i64,
        page: u64,
        size: u64,
    ) -> Result<(Vec<AttendanceRecord>, u64)> {
        self.list_attendance_by_student_impl(student_id, page, size)
            .await
    }

    async fn student_absence_total(&self, student_id: i64) -> Result<f64> {
        self.student_absence_total_impl(student_id).await
    }

    async fn set_attendance_justified(
        &self,
        id: i64,
        justified: bool,
    ) -> Result<Option<AttendanceRecord>> {
        self.set_attendance_justified_impl(id, justified).await
    }

    async fn set_attendance_note(
        &self,
        id: i64,
        note: Option<String>,
    ) -> Result<Option<AttendanceRecord>> {
        self.set_attendance_note_impl(id, note).await
    }

    async fn create_notifications(&self, drafts: Vec<NotificationDraft>) -> Result<usize> {
        self.create_notifications_impl(drafts).await
    }

    async fn list_recent_notifications(
        &self,
        user_id: i64,
        limit: u64,
        unread_only: bool,
    ) -> Result<Vec<Notification>> {
        self.list_recent_notifications_impl(user_id, limit, unread_only)
            .await
    }

    async fn count_unread_notifications(&self, user_id: i64) -> Result<u64> {
        self.count_unread_notifications_impl(user_id).await
    }

    async fn mark_notification_read(&self, user_id: i64, id: i64) -> Result<Option<bool>> {
        self.mark_notification_read_impl(user_id, id).await
    }

    async fn mark_all_notifications_read(&self, user_id: i64) -> Result<u64> {
        self.mark_all_notifications_read_impl(user_id).await
    }

    async fn purge_read_notifications(&self, created_before: i64) -> Result<u64> {
        self.purge_read_notifications_impl(created_before).await
    }

    async fn create_grades(&self, grades: Vec<NewGrade>) -> Result<Vec<Grade>> {
        self.create_grades_impl(grades).await
    }

    async fn create_sanction(&self, sanction: NewSanction) -> Result<Sanction> {
        self.create_sanction_impl(sanction).await
    }

    async fn create_event(&self, event: NewEvent) -> Result<Event> {
        self.create_event_impl(event).await
    }

    async fn create_messages(&self, messages: Vec<NewMessage>) -> Result<Vec<Message>> {
        self.create_messages_impl(messages).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("boletin.db").unwrap(),
            "sqlite://boletin.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("postgres://u:p@localhost/db").unwrap(),
            "postgres://u:p@localhost/db"
        );
        assert!(SeaOrmStorage::build_database_url("ftp://nope").is_err());
    }
}
