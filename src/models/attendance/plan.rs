//! Diff between the stored attendance rows and the requested states.
//!
//! Pure, so the storage layer only has to execute it: one fetch produces
//! `existing`, then the plan is applied with grouped updates and one bulk
//! insert.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use super::entities::{AttendanceRecord, AttendanceStatus};

/// Requested states for one (date, type) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceBatch {
    pub date: NaiveDate,
    pub attendance_type: String,
    /// Student id -> target state. Ordered so writes are deterministic.
    pub statuses: BTreeMap<i64, AttendanceStatus>,
    pub created_by: Option<i64>,
}

impl AttendanceBatch {
    pub fn new(date: NaiveDate, attendance_type: impl Into<String>) -> Self {
        Self {
            date,
            attendance_type: attendance_type.into(),
            statuses: BTreeMap::new(),
            created_by: None,
        }
    }

    pub fn student_ids(&self) -> Vec<i64> {
        self.statuses.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

/// Target columns shared by every row of one `UPDATE ... WHERE id IN (...)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UpdateGroup {
    pub present: bool,
    pub late: bool,
    pub clear_justified: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpsertPlan {
    /// Record ids per target state.
    pub updates: BTreeMap<UpdateGroup, Vec<i64>>,
    /// (student id, state) pairs without a row yet.
    pub inserts: Vec<(i64, AttendanceStatus)>,
    pub unchanged: usize,
    /// Students whose presence went true -> false, or new rows created absent.
    pub newly_absent: Vec<i64>,
}

impl UpsertPlan {
    pub fn update_count(&self) -> usize {
        self.updates.values().map(Vec::len).sum()
    }
}

/// Outcome of applying a plan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpsertOutcome {
    /// Every student of the batch counts as saved, changed or not.
    pub saved: usize,
    pub inserted: usize,
    pub updated: usize,
    pub newly_absent: Vec<i64>,
}

pub fn plan_upsert(existing: &[AttendanceRecord], batch: &AttendanceBatch) -> UpsertPlan {
    let by_student: HashMap<i64, &AttendanceRecord> = existing
        .iter()
        .filter(|r| r.date == batch.date && r.attendance_type == batch.attendance_type)
        .map(|r| (r.student_id, r))
        .collect();

    let mut plan = UpsertPlan::default();

    for (&student_id, status) in &batch.statuses {
        let target = AttendanceStatus::new(status.is_present(), status.is_late());

        match by_student.get(&student_id) {
            Some(record) => {
                // Presence on time cancels any standing justification.
                let clear_justified = record.justified && target.is_plain_presence();
                let changed = record.present != target.is_present()
                    || record.late != target.is_late()
                    || clear_justified;

                if !changed {
                    plan.unchanged += 1;
                    continue;
                }

                plan.updates
                    .entry(UpdateGroup {
                        present: target.is_present(),
                        late: target.is_late(),
                        clear_justified,
                    })
                    .or_default()
                    .push(record.id);

                if record.present && !target.is_present() {
                    plan.newly_absent.push(student_id);
                }
            }
            None => {
                plan.inserts.push((student_id, target));
                if !target.is_present() {
                    plan.newly_absent.push(student_id);
                }
            }
        }
    }

    plan.newly_absent.sort_unstable();
    plan.newly_absent.dedup();
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn record(id: i64, student_id: i64, present: bool, late: bool, justified: bool) -> AttendanceRecord {
        AttendanceRecord {
            id,
            student_id,
            date: date(),
            attendance_type: "clases".to_string(),
            present,
            late,
            justified,
            note: None,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn batch(entries: &[(i64, AttendanceStatus)]) -> AttendanceBatch {
        let mut batch = AttendanceBatch::new(date(), "clases");
        batch.statuses.extend(entries.iter().copied());
        batch
    }

    #[test]
    fn test_new_rows_are_inserted_and_absent_ones_flagged() {
        let plan = plan_upsert(
            &[],
            &batch(&[(42, AttendanceStatus::absent()), (43, AttendanceStatus::on_time())]),
        );
        assert_eq!(plan.inserts.len(), 2);
        assert_eq!(plan.update_count(), 0);
        assert_eq!(plan.newly_absent, vec![42]);
    }

    #[test]
    fn test_present_to_absent_is_newly_absent() {
        let existing = vec![record(1, 42, true, false, false)];
        let plan = plan_upsert(&existing, &batch(&[(42, AttendanceStatus::absent())]));
        assert_eq!(plan.newly_absent, vec![42]);
        let group = UpdateGroup {
            present: false,
            late: false,
            clear_justified: false,
        };
        assert_eq!(plan.updates.get(&group), Some(&vec![1]));
    }

    #[test]
    fn test_already_absent_is_not_renotified() {
        let existing = vec![record(1, 42, false, false, false)];
        let plan = plan_upsert(&existing, &batch(&[(42, AttendanceStatus::absent())]));
        assert!(plan.newly_absent.is_empty());
        assert_eq!(plan.unchanged, 1);
        assert_eq!(plan.update_count(), 0);
    }

    #[test]
    fn test_plain_presence_clears_justification() {
        let existing = vec![record(1, 42, true, true, true)];
        let plan = plan_upsert(&existing, &batch(&[(42, AttendanceStatus::on_time())]));
        let group = UpdateGroup {
            present: true,
            late: false,
            clear_justified: true,
        };
        assert_eq!(plan.updates.get(&group), Some(&vec![1]));
    }

    #[test]
    fn test_absence_keeps_justification() {
        let existing = vec![record(1, 42, true, true, true)];
        let plan = plan_upsert(&existing, &batch(&[(42, AttendanceStatus::absent())]));
        let group = UpdateGroup {
            present: false,
            late: false,
            clear_justified: false,
        };
        assert_eq!(plan.updates.get(&group), Some(&vec![1]));
        assert_eq!(plan.newly_absent, vec![42]);
    }

    #[test]
    fn test_updates_are_grouped_by_target_state() {
        let existing = vec![
            record(1, 10, true, false, false),
            record(2, 11, true, false, false),
            record(3, 12, false, false, false),
        ];
        let plan = plan_upsert(
            &existing,
            &batch(&[
                (10, AttendanceStatus::late()),
                (11, AttendanceStatus::late()),
                (12, AttendanceStatus::on_time()),
            ]),
        );
        assert_eq!(plan.updates.len(), 2);
        assert_eq!(plan.update_count(), 3);
        assert!(plan.newly_absent.is_empty());
    }

    #[test]
    fn test_rows_of_other_days_are_ignored() {
        let mut other_day = record(1, 42, true, false, false);
        other_day.date = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();
        let plan = plan_upsert(&[other_day], &batch(&[(42, AttendanceStatus::absent())]));
        assert_eq!(plan.inserts, vec![(42, AttendanceStatus::absent())]);
    }
}
