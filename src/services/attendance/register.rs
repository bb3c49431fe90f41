use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use actix_web::{HttpMessage, HttpRequest, HttpResponse, Result as ActixResult, web};
use chrono::NaiveDate;
use tracing::{error, info, warn};

use super::AttendanceService;
use super::normalize::{
    AttendanceSubmission, BatchHeader, NormalizeError, payload_from_body, resolve_student_map,
    roster_statuses,
};
use crate::config::AppConfig;
use crate::errors::BoletinError;
use crate::middlewares::RequestContext;
use crate::models::attendance::entities::AttendanceStatus;
use crate::models::attendance::plan::AttendanceBatch;
use crate::models::attendance::responses::{
    AttendanceItem, RegistrationFailure, RegistrationResponse,
};
use crate::models::students::entities::Student;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::course_access::allowed_courses;
use crate::services::notifications::fanout::notify_absences;
use crate::services::students::lookup_students;
use crate::services::{bad_request, forbidden, internal_error, require_context};
use crate::storage::Storage;

const SAVED_MESSAGE: &str = "Asistencia guardada ✅";
const NOTHING_SAVED: &str = "No se pudo guardar ninguna asistencia. Revisá que las claves de 'asistencias' sean IDs (PK) o legajos válidos del curso.";
const SAVE_FAILED: &str = "Error guardando asistencias (bulk).";

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Running totals over the batches of one request.
struct Registration<'a> {
    storage: &'a Arc<dyn Storage>,
    ctx: &'a RequestContext,
    return_items: bool,
    saved: usize,
    items: Vec<AttendanceItem>,
    notified: usize,
    notif_error: Option<String>,
}

impl<'a> Registration<'a> {
    fn new(storage: &'a Arc<dyn Storage>, ctx: &'a RequestContext, return_items: bool) -> Self {
        Self {
            storage,
            ctx,
            return_items,
            saved: 0,
            items: Vec::new(),
            notified: 0,
            notif_error: None,
        }
    }

    /// Upserts one batch, then notifies the students that became absent.
    async fn apply(
        &mut self,
        mut batch: AttendanceBatch,
        students: &HashMap<i64, Student>,
    ) -> Result<(), BoletinError> {
        if batch.is_empty() {
            return Ok(());
        }
        batch.created_by = Some(self.ctx.user_id());

        let outcome = self.storage.upsert_attendance(&batch).await?;
        self.saved += outcome.saved;

        if !self.return_items && outcome.newly_absent.is_empty() {
            return Ok(());
        }

        let lookup_ids = if self.return_items {
            batch.student_ids()
        } else {
            outcome.newly_absent.clone()
        };
        let records = match self
            .storage
            .find_attendance(&lookup_ids, batch.date, Some(batch.attendance_type.as_str()))
            .await
        {
            Ok(records) => records,
            Err(e) => {
                warn!("Saved attendance could not be read back: {}", e);
                Vec::new()
            }
        };
        let by_student: HashMap<i64, _> = records.iter().map(|r| (r.student_id, r)).collect();

        if self.return_items {
            self.items.extend(records.iter().filter_map(|record| {
                students
                    .get(&record.student_id)
                    .map(|student| AttendanceItem::from_record(record, student))
            }));
        }

        let absent: Vec<&Student> = outcome
            .newly_absent
            .iter()
            .filter_map(|id| students.get(id))
            .collect();
        let report = notify_absences(
            self.storage,
            &absent,
            &by_student,
            batch.date,
            &batch.attendance_type,
            &self.ctx.user,
        )
        .await;
        self.notified += report.notified;
        if self.notif_error.is_none() {
            self.notif_error = report.visible_error(self.ctx);
        }
        Ok(())
    }

    fn response(self, header: Option<&BatchHeader>, errors: usize) -> RegistrationResponse {
        RegistrationResponse {
            curso: header.map(|h| h.course.to_string()),
            fecha: header.map(|h| h.date.unwrap_or_else(today)),
            tipo_asistencia: header.map(|h| h.attendance_type.clone()),
            guardadas: self.saved,
            errores: errors,
            items: self.return_items.then_some(self.items),
            notificados: self.notified,
            notif_error: self.notif_error,
        }
    }
}

fn normalize_error_response(err: NormalizeError) -> HttpResponse {
    let code = match err {
        NormalizeError::UnknownCourse(_) => ErrorCode::CourseInvalid,
        _ => ErrorCode::AttendanceInvalidPayload,
    };
    bad_request(code, err.message())
}

fn course_denied() -> HttpResponse {
    forbidden(
        ErrorCode::CoursePermissionDenied,
        "No tenés permisos para ese curso.",
    )
}

fn save_failed(err: BoletinError) -> HttpResponse {
    error!("Attendance upsert failed: {}", err);
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::AttendanceSaveFailed,
        SAVE_FAILED,
    ))
}

fn batch_for(header: &BatchHeader, statuses: BTreeMap<i64, AttendanceStatus>) -> AttendanceBatch {
    let mut batch = AttendanceBatch::new(
        header.date.unwrap_or_else(today),
        header.attendance_type.as_str(),
    );
    batch.statuses = statuses;
    batch
}

pub async fn register_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
    body: web::Bytes,
) -> ActixResult<HttpResponse> {
    let ctx = match require_context(request) {
        Ok(ctx) => ctx,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    let parsed = match payload_from_body(&request.content_type(), &body)
        .and_then(AttendanceSubmission::from_payload)
    {
        Ok(parsed) => parsed,
        Err(err) => return Ok(normalize_error_response(err)),
    };

    let scope = match allowed_courses(&storage, &ctx.user).await {
        Ok(scope) => scope,
        Err(e) => return Ok(internal_error(format!("Error resolviendo cursos: {e}"))),
    };

    let mut registration = Registration::new(&storage, &ctx, parsed.return_items);

    match parsed.submission {
        AttendanceSubmission::StudentMap {
            header,
            entries,
            invalid,
        } => {
            if !scope.allows(header.course) {
                return Ok(course_denied());
            }

            let students = match lookup_students(&storage, entries.iter().map(|(key, _)| key)).await
            {
                Ok(students) => students,
                Err(e) => return Ok(save_failed(e)),
            };
            let (statuses, unresolved) = resolve_student_map(&entries, &students, header.course);
            let errors = unresolved + invalid;

            if statuses.is_empty() && errors > 0 {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error(
                    ErrorCode::AttendanceInvalidPayload,
                    RegistrationFailure {
                        guardadas: 0,
                        errores: errors,
                    },
                    NOTHING_SAVED,
                )));
            }

            let by_id: HashMap<i64, Student> =
                students.into_iter().map(|s| (s.id, s)).collect();
            if let Err(e) = registration.apply(batch_for(&header, statuses), &by_id).await {
                return Ok(save_failed(e));
            }

            info!(
                "User {} registered {} attendance rows for {} ({} errors)",
                ctx.user_id(),
                registration.saved,
                header.course,
                errors
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                registration.response(Some(&header), errors),
                SAVED_MESSAGE,
            )))
        }

        AttendanceSubmission::IdLists {
            header,
            present,
            late,
        } => {
            if !scope.allows(header.course) {
                return Ok(course_denied());
            }

            let roster = match storage.list_students_by_course(header.course).await {
                Ok(roster) => roster,
                Err(e) => return Ok(save_failed(e)),
            };
            let statuses = roster_statuses(&roster, &present, &late);
            let by_id: HashMap<i64, Student> = roster.into_iter().map(|s| (s.id, s)).collect();
            if let Err(e) = registration.apply(batch_for(&header, statuses), &by_id).await {
                return Ok(save_failed(e));
            }

            info!(
                "User {} registered {} attendance rows for {}",
                ctx.user_id(),
                registration.saved,
                header.course
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                registration.response(Some(&header), 0),
                SAVED_MESSAGE,
            )))
        }

        AttendanceSubmission::Items { items, invalid } => {
            let students = match lookup_students(&storage, items.iter().map(|item| &item.key)).await
            {
                Ok(students) => students,
                Err(e) => return Ok(save_failed(e)),
            };
            let default_type = &AppConfig::get().attendance.default_type;

            let mut errors = invalid;
            let mut batches: BTreeMap<(NaiveDate, String), AttendanceBatch> = BTreeMap::new();
            let mut courses = BTreeSet::new();
            for item in &items {
                let Some(student) = students.iter().find(|s| item.key.matches(s)) else {
                    errors += 1;
                    continue;
                };
                if !scope.allows(&student.course) {
                    errors += 1;
                    continue;
                }
                let date = item.date.unwrap_or_else(today);
                let attendance_type = item
                    .attendance_type
                    .clone()
                    .unwrap_or_else(|| default_type.clone());
                batches
                    .entry((date, attendance_type.clone()))
                    .or_insert_with(|| AttendanceBatch::new(date, attendance_type))
                    .statuses
                    .insert(student.id, item.status);
                courses.insert(student.course.clone());
            }

            let header = single_header(&batches, &courses);
            let by_id: HashMap<i64, Student> = students.into_iter().map(|s| (s.id, s)).collect();
            for batch in batches.into_values() {
                if let Err(e) = registration.apply(batch, &by_id).await {
                    return Ok(save_failed(e));
                }
            }

            info!(
                "User {} registered {} attendance items ({} errors)",
                ctx.user_id(),
                registration.saved,
                errors
            );
            let mut response = registration.response(header.as_ref(), errors);
            if header.is_none() && courses.len() == 1 {
                response.curso = courses.into_iter().next();
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(response, SAVED_MESSAGE)))
        }
    }
}

/// Header shared by every batch, when an item list produced exactly one
/// (date, type) pair within one catalog course.
fn single_header(
    batches: &BTreeMap<(NaiveDate, String), AttendanceBatch>,
    courses: &BTreeSet<String>,
) -> Option<BatchHeader> {
    if batches.len() != 1 || courses.len() != 1 {
        return None;
    }
    let (date, attendance_type) = batches.keys().next()?;
    let course = courses
        .iter()
        .next()
        .and_then(|c| crate::models::courses::entities::normalize_course(c))?;
    Some(BatchHeader {
        course,
        date: Some(*date),
        attendance_type: attendance_type.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_header_needs_one_group() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let mut batches = BTreeMap::new();
        let mut batch = AttendanceBatch::new(date, "clases");
        batch.statuses.insert(1, AttendanceStatus::absent());
        batches.insert((date, "clases".to_string()), batch);
        let courses = BTreeSet::from(["1A".to_string()]);

        let header = single_header(&batches, &courses).unwrap();
        assert_eq!(header.course, "1A");
        assert_eq!(header.date, Some(date));

        let two = BTreeSet::from(["1A".to_string(), "2B".to_string()]);
        assert!(single_header(&batches, &two).is_none());
    }

    #[test]
    fn test_unknown_course_maps_to_course_code() {
        let response = normalize_error_response(NormalizeError::UnknownCourse("9Z".into()));
        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }
}
