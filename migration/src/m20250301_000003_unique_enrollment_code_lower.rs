use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DatabaseBackend};

const INDEX: &str = "idx_students_enrollment_code_lower";

/// Enrollment codes are compared case-insensitively, so uniqueness has to
/// hold on `lower(enrollment_code)` too.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let sql = match manager.get_database_backend() {
            DatabaseBackend::MySql => {
                format!("CREATE UNIQUE INDEX {INDEX} ON students ((lower(enrollment_code)))")
            }
            _ => format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {INDEX} ON students (lower(enrollment_code))"
            ),
        };
        manager.get_connection().execute_unprepared(&sql).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let sql = match manager.get_database_backend() {
            DatabaseBackend::MySql => format!("DROP INDEX {INDEX} ON students"),
            _ => format!("DROP INDEX IF EXISTS {INDEX}"),
        };
        manager.get_connection().execute_unprepared(&sql).await?;
        Ok(())
    }
}
