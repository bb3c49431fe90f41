//! Attendance rows and the transactional batch upsert.

use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, warn};

use super::SeaOrmStorage;
use crate::entity::attendance_records::{ActiveModel, Column, Entity as AttendanceRecords};
use crate::errors::{BoletinError, Result};
use crate::models::attendance::{
    entities::{AttendanceRecord, AttendanceStatus},
    plan::{AttendanceBatch, UpsertOutcome, plan_upsert},
};

fn new_row(batch: &AttendanceBatch, student_id: i64, status: AttendanceStatus, now: i64) -> ActiveModel {
    ActiveModel {
        student_id: Set(student_id),
        date: Set(batch.date),
        attendance_type: Set(batch.attendance_type.clone()),
        present: Set(status.is_present()),
        late: Set(status.is_late()),
        justified: Set(false),
        note: Set(None),
        created_by: Set(batch.created_by),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
}

/// What the conflict fallback did to one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyWrite {
    Inserted { absent: bool },
    Updated { newly_absent: bool },
    Unchanged,
}

/// Counters of a replayed insert, taken from the rows actually found.
#[derive(Debug, Default, PartialEq)]
struct Replay {
    inserted: usize,
    updated: usize,
    unchanged: usize,
    newly_absent: Vec<i64>,
}

fn db_error(context: &str) -> impl FnOnce(sea_orm::DbErr) -> BoletinError + '_ {
    move |e| BoletinError::database_operation(format!("{context}: {e}"))
}

impl SeaOrmStorage {
    /// One fetch, grouped updates and one bulk insert, all in one transaction.
    ///
    /// The insert runs in a savepoint; if a concurrent request created one of
    /// the keys in the meantime the savepoint is rolled back and the inserts
    /// are replayed as update-or-create.
    pub async fn upsert_attendance_impl(&self, batch: &AttendanceBatch) -> Result<UpsertOutcome> {
        if batch.is_empty() {
            return Ok(UpsertOutcome::default());
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(db_error("Failed to open attendance transaction"))?;

        let existing: Vec<AttendanceRecord> = AttendanceRecords::find()
            .filter(Column::StudentId.is_in(batch.student_ids()))
            .filter(Column::Date.eq(batch.date))
            .filter(Column::AttendanceType.eq(batch.attendance_type.as_str()))
            .all(&txn)
            .await
            .map_err(db_error("Failed to load attendance rows"))?
            .into_iter()
            .map(|m| m.into_attendance_record())
            .collect();

        let plan = plan_upsert(&existing, batch);
        let now = chrono::Utc::now().timestamp();

        for (group, ids) in &plan.updates {
            let mut update = AttendanceRecords::update_many()
                .col_expr(Column::Present, Expr::value(group.present))
                .col_expr(Column::Late, Expr::value(group.late))
                .col_expr(Column::UpdatedAt, Expr::value(now));
            if group.clear_justified {
                update = update.col_expr(Column::Justified, Expr::value(false));
            }
            update
                .filter(Column::Id.is_in(ids.iter().copied()))
                .exec(&txn)
                .await
                .map_err(db_error("Failed to update attendance rows"))?;
        }

        let mut outcome = UpsertOutcome {
            saved: batch.statuses.len(),
            inserted: plan.inserts.len(),
            updated: plan.update_count(),
            newly_absent: plan.newly_absent.clone(),
        };
        let mut unchanged = plan.unchanged;

        if let Some(replay) = insert_or_replay(&txn, batch, &plan.inserts, now).await? {
            // Keys the plan saw as new are recounted from the replay.
            outcome
                .newly_absent
                .retain(|id| !plan.inserts.iter().any(|(student_id, _)| student_id == id));
            outcome.newly_absent.extend(replay.newly_absent);
            outcome.newly_absent.sort_unstable();
            outcome.newly_absent.dedup();
            outcome.inserted = replay.inserted;
            outcome.updated += replay.updated;
            unchanged += replay.unchanged;
        }

        txn.commit()
            .await
            .map_err(db_error("Failed to commit attendance transaction"))?;

        debug!(
            "Attendance upsert {} {}: {} inserted, {} updated, {} unchanged",
            batch.date, batch.attendance_type, outcome.inserted, outcome.updated, unchanged
        );

        Ok(outcome)
    }

    pub async fn get_attendance_by_id_impl(&self, id: i64) -> Result<Option<AttendanceRecord>> {
        let result = AttendanceRecords::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error("Failed to query attendance row"))?;

        Ok(result.map(|m| m.into_attendance_record()))
    }

    pub async fn find_attendance_impl(
        &self,
        student_ids: &[i64],
        date: NaiveDate,
        attendance_type: Option<&str>,
    ) -> Result<Vec<AttendanceRecord>> {
        if student_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut select = AttendanceRecords::find()
            .filter(Column::StudentId.is_in(student_ids.iter().copied()))
            .filter(Column::Date.eq(date));
        if let Some(kind) = attendance_type {
            select = select.filter(Column::AttendanceType.eq(kind));
        }

        let result = select
            .order_by_asc(Column::StudentId)
            .all(&self.db)
            .await
            .map_err(db_error("Failed to query attendance rows"))?;

        Ok(result
            .into_iter()
            .map(|m| m.into_attendance_record())
            .collect())
    }

    pub async fn list_attendance_by_student_impl(
        &self,
        student_id: i64,
        page: u64,
        size: u64,
    ) -> Result<(Vec<AttendanceRecord>, u64)> {
        let paginator = AttendanceRecords::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_desc(Column::Date)
            .order_by_asc(Column::AttendanceType)
            .paginate(&self.db, size);

        let total = paginator
            .num_items()
            .await
            .map_err(db_error("Failed to count attendance rows"))?;
        let rows = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(db_error("Failed to list attendance rows"))?;

        Ok((
            rows.into_iter()
                .map(|m| m.into_attendance_record())
                .collect(),
            total,
        ))
    }

    pub async fn student_absence_total_impl(&self, student_id: i64) -> Result<f64> {
        let rows = AttendanceRecords::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::Justified.eq(false))
            .filter(
                Condition::any()
                    .add(Column::Present.eq(false))
                    .add(Column::Late.eq(true)),
            )
            .all(&self.db)
            .await
            .map_err(db_error("Failed to load absences"))?;

        Ok(rows
            .into_iter()
            .map(|m| m.into_attendance_record().absence_value())
            .sum())
    }

    pub async fn set_attendance_justified_impl(
        &self,
        id: i64,
        justified: bool,
    ) -> Result<Option<AttendanceRecord>> {
        let Some(existing) = AttendanceRecords::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error("Failed to query attendance row"))?
        else {
            return Ok(None);
        };

        if justified && existing.present && !existing.late {
            return Err(BoletinError::validation(
                "A plain presence cannot be justified",
            ));
        }

        let mut model: ActiveModel = existing.into();
        model.justified = Set(justified);
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let result = model
            .update(&self.db)
            .await
            .map_err(db_error("Failed to update justification"))?;

        Ok(Some(result.into_attendance_record()))
    }

    pub async fn set_attendance_note_impl(
        &self,
        id: i64,
        note: Option<String>,
    ) -> Result<Option<AttendanceRecord>> {
        let Some(existing) = AttendanceRecords::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error("Failed to query attendance row"))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        model.note = Set(note);
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let result = model
            .update(&self.db)
            .await
            .map_err(db_error("Failed to update attendance note"))?;

        Ok(Some(result.into_attendance_record()))
    }
}

/// Bulk insert inside a savepoint. `None` when it went through; otherwise
/// the savepoint is rolled back and every key is replayed as update-or-create
/// on `txn`.
async fn insert_or_replay(
    txn: &DatabaseTransaction,
    batch: &AttendanceBatch,
    inserts: &[(i64, AttendanceStatus)],
    now: i64,
) -> Result<Option<Replay>> {
    if inserts.is_empty() {
        return Ok(None);
    }

    let rows: Vec<ActiveModel> = inserts
        .iter()
        .map(|(student_id, status)| new_row(batch, *student_id, *status, now))
        .collect();

    let savepoint = txn
        .begin()
        .await
        .map_err(db_error("Failed to open savepoint"))?;

    let err = match AttendanceRecords::insert_many(rows).exec(&savepoint).await {
        Ok(_) => {
            savepoint
                .commit()
                .await
                .map_err(db_error("Failed to release savepoint"))?;
            return Ok(None);
        }
        Err(e) => e,
    };

    savepoint
        .rollback()
        .await
        .map_err(db_error("Failed to roll back savepoint"))?;
    warn!(
        "Bulk attendance insert conflicted ({} rows), retrying row by row: {err}",
        inserts.len()
    );

    let mut replay = Replay::default();
    for (student_id, status) in inserts {
        match update_or_create(txn, batch, *student_id, *status, now).await? {
            KeyWrite::Inserted { absent } => {
                replay.inserted += 1;
                if absent {
                    replay.newly_absent.push(*student_id);
                }
            }
            KeyWrite::Updated { newly_absent } => {
                replay.updated += 1;
                if newly_absent {
                    replay.newly_absent.push(*student_id);
                }
            }
            KeyWrite::Unchanged => replay.unchanged += 1,
        }
    }
    Ok(Some(replay))
}

/// Conflict fallback for one key, with the same transitions as `plan_upsert`.
async fn update_or_create<C>(
    conn: &C,
    batch: &AttendanceBatch,
    student_id: i64,
    status: AttendanceStatus,
    now: i64,
) -> Result<KeyWrite>
where
    C: ConnectionTrait,
{
    let existing = AttendanceRecords::find()
        .filter(Column::StudentId.eq(student_id))
        .filter(Column::Date.eq(batch.date))
        .filter(Column::AttendanceType.eq(batch.attendance_type.as_str()))
        .one(conn)
        .await
        .map_err(db_error("Failed to reload attendance row"))?;

    let Some(row) = existing else {
        new_row(batch, student_id, status, now)
            .insert(conn)
            .await
            .map_err(db_error("Failed to insert attendance row"))?;
        return Ok(KeyWrite::Inserted {
            absent: !status.is_present(),
        });
    };

    let clear_justified = row.justified && status.is_plain_presence();
    let newly_absent = row.present && !status.is_present();
    if row.present == status.is_present() && row.late == status.is_late() && !clear_justified {
        return Ok(KeyWrite::Unchanged);
    }

    let mut model: ActiveModel = row.into();
    model.present = Set(status.is_present());
    model.late = Set(status.is_late());
    if clear_justified {
        model.justified = Set(false);
    }
    model.updated_at = Set(now);
    model
        .update(conn)
        .await
        .map_err(db_error("Failed to update attendance row"))?;

    Ok(KeyWrite::Updated { newly_absent })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::students::requests::CreateStudentRequest;
    use crate::storage::Storage;

    async fn storage_with_students(count: usize) -> (SeaOrmStorage, Vec<i64>) {
        let storage = SeaOrmStorage::in_memory().await.unwrap();
        let mut ids = Vec::new();
        for i in 0..count {
            let student = storage
                .create_student(CreateStudentRequest {
                    enrollment_code: format!("LEG{i:03}"),
                    first_name: format!("Alumno{i}"),
                    last_name: "Prueba".to_string(),
                    course: "1A".to_string(),
                    parent_user_id: None,
                    user_id: None,
                })
                .await
                .unwrap();
            ids.push(student.id);
        }
        (storage, ids)
    }

    fn batch(entries: &[(i64, AttendanceStatus)]) -> AttendanceBatch {
        let mut batch = AttendanceBatch::new(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(), "clases");
        batch.statuses.extend(entries.iter().copied());
        batch
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let (storage, ids) = storage_with_students(2).await;
        let request = batch(&[(ids[0], AttendanceStatus::absent()), (ids[1], AttendanceStatus::late())]);

        let first = storage.upsert_attendance(&request).await.unwrap();
        assert_eq!(first.saved, 2);
        assert_eq!(first.inserted, 2);
        assert_eq!(first.newly_absent, vec![ids[0]]);

        let second = storage.upsert_attendance(&request).await.unwrap();
        assert_eq!(second.saved, 2);
        assert_eq!(second.inserted, 0);
        assert_eq!(second.updated, 0);
        assert!(second.newly_absent.is_empty());

        let rows = storage
            .find_attendance(&ids, request.date, Some("clases"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        let late = rows.iter().find(|r| r.student_id == ids[1]).unwrap();
        assert!(late.present && late.late);
    }

    #[tokio::test]
    async fn test_presence_flip_updates_and_reports_newly_absent() {
        let (storage, ids) = storage_with_students(1).await;
        storage
            .upsert_attendance(&batch(&[(ids[0], AttendanceStatus::on_time())]))
            .await
            .unwrap();

        let outcome = storage
            .upsert_attendance(&batch(&[(ids[0], AttendanceStatus::absent())]))
            .await
            .unwrap();
        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.newly_absent, vec![ids[0]]);

        let again = storage
            .upsert_attendance(&batch(&[(ids[0], AttendanceStatus::absent())]))
            .await
            .unwrap();
        assert!(again.newly_absent.is_empty());
    }

    #[tokio::test]
    async fn test_plain_presence_clears_justification() {
        let (storage, ids) = storage_with_students(1).await;
        storage
            .upsert_attendance(&batch(&[(ids[0], AttendanceStatus::late())]))
            .await
            .unwrap();
        let row = storage
            .find_attendance(&ids, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(), None)
            .await
            .unwrap()
            .remove(0);
        let justified = storage
            .set_attendance_justified(row.id, true)
            .await
            .unwrap()
            .unwrap();
        assert!(justified.justified);
        assert_eq!(justified.absence_value(), 0.0);

        storage
            .upsert_attendance(&batch(&[(ids[0], AttendanceStatus::on_time())]))
            .await
            .unwrap();
        let row = storage.get_attendance_by_id(row.id).await.unwrap().unwrap();
        assert!(row.present && !row.late && !row.justified);
    }

    #[tokio::test]
    async fn test_justifying_plain_presence_is_rejected() {
        let (storage, ids) = storage_with_students(1).await;
        storage
            .upsert_attendance(&batch(&[(ids[0], AttendanceStatus::on_time())]))
            .await
            .unwrap();
        let row = storage
            .find_attendance(&ids, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(), None)
            .await
            .unwrap()
            .remove(0);

        let err = storage.set_attendance_justified(row.id, true).await.unwrap_err();
        assert_eq!(err.code(), "E007");
        let unchanged = storage.get_attendance_by_id(row.id).await.unwrap().unwrap();
        assert!(!unchanged.justified);
    }

    #[tokio::test]
    async fn test_absence_total_weights_rows() {
        let (storage, ids) = storage_with_students(1).await;
        let mut absent_day = batch(&[(ids[0], AttendanceStatus::absent())]);
        storage.upsert_attendance(&absent_day).await.unwrap();
        absent_day.date = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();
        absent_day.statuses.insert(ids[0], AttendanceStatus::late());
        storage.upsert_attendance(&absent_day).await.unwrap();

        let total = storage.student_absence_total(ids[0]).await.unwrap();
        assert!((total - 1.5).abs() < f64::EPSILON);

        let (page, count) = storage
            .list_attendance_by_student(ids[0], 1, 10)
            .await
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(page[0].date, NaiveDate::from_ymd_opt(2025, 3, 11).unwrap());
    }

    #[tokio::test]
    async fn test_fallback_does_not_report_existing_absence() {
        let (storage, ids) = storage_with_students(1).await;
        let absent = batch(&[(ids[0], AttendanceStatus::absent())]);
        storage.upsert_attendance(&absent).await.unwrap();

        let txn = storage.db.begin().await.unwrap();
        let now = chrono::Utc::now().timestamp();
        let write = update_or_create(&txn, &absent, ids[0], AttendanceStatus::absent(), now)
            .await
            .unwrap();
        assert_eq!(write, KeyWrite::Unchanged);

        let write = update_or_create(&txn, &absent, ids[0], AttendanceStatus::late(), now)
            .await
            .unwrap();
        assert_eq!(write, KeyWrite::Updated { newly_absent: false });
        txn.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_conflicting_bulk_insert_is_replayed() {
        let (storage, ids) = storage_with_students(2).await;
        // A concurrent request already stored the first student as absent.
        storage
            .upsert_attendance(&batch(&[(ids[0], AttendanceStatus::absent())]))
            .await
            .unwrap();

        // Inserts planned as if neither row existed yet.
        let request = batch(&[(ids[0], AttendanceStatus::absent()), (ids[1], AttendanceStatus::absent())]);
        let inserts: Vec<(i64, AttendanceStatus)> =
            request.statuses.iter().map(|(id, s)| (*id, *s)).collect();

        let txn = storage.db.begin().await.unwrap();
        let now = chrono::Utc::now().timestamp();
        let replay = insert_or_replay(&txn, &request, &inserts, now)
            .await
            .unwrap()
            .expect("the duplicate key forces a replay");
        txn.commit().await.unwrap();

        assert_eq!(
            replay,
            Replay {
                inserted: 1,
                updated: 0,
                unchanged: 1,
                newly_absent: vec![ids[1]],
            }
        );
        let rows = storage
            .find_attendance(&ids, request.date, Some("clases"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| !r.present));
    }
}
