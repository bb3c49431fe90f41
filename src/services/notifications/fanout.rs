//! Notification drafts per trigger and their bulk dispatch.
//!
//! Builders are pure: they take the recipients already resolved by
//! [`recipients`](super::recipients) and return drafts. [`dispatch`] writes
//! them with one insert and never fails the caller; a failure is reported in
//! the returned [`FanoutReport`] and logged.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;
use tracing::{debug, warn};

use super::recipients::recipients_for_students;
use crate::config::AppConfig;
use crate::middlewares::RequestContext;
use crate::models::attendance::entities::{AttendanceRecord, attendance_type_label};
use crate::models::events::entities::Event;
use crate::models::grades::entities::Grade;
use crate::models::messages::entities::Message;
use crate::models::notifications::entities::{NotificationCategory, NotificationDraft};
use crate::models::sanctions::entities::Sanction;
use crate::models::students::entities::Student;
use crate::models::users::entities::User;
use crate::storage::Storage;
use crate::utils::text::truncate_chars;

/// Outcome of one fanout call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FanoutReport {
    pub notified: usize,
    pub error: Option<String>,
}

impl FanoutReport {
    fn failed(error: impl Into<String>) -> Self {
        Self {
            notified: 0,
            error: Some(error.into()),
        }
    }

    /// The error, only for callers allowed to see internal failures.
    pub fn visible_error(&self, ctx: &RequestContext) -> Option<String> {
        self.error.clone().filter(|_| ctx.sees_diagnostics())
    }
}

fn description(text: &str) -> String {
    truncate_chars(
        text.trim(),
        AppConfig::get().notifications.description_max_len,
    )
}

fn student_url(student: &Student, tab: &str) -> String {
    format!("/alumnos/{}/?tab={tab}", student.id)
}

fn base_meta(student: &Student) -> serde_json::Map<String, serde_json::Value> {
    let mut meta = serde_json::Map::new();
    meta.insert("alumno_id".into(), json!(student.id));
    meta.insert("alumno_legajo".into(), json!(student.enrollment_code));
    meta.insert("curso".into(), json!(student.course));
    meta
}

/// One "Inasistencia registrada" per recipient of every newly absent student.
pub fn absence_drafts(
    students: &[&Student],
    records: &HashMap<i64, &AttendanceRecord>,
    recipients: &HashMap<i64, Vec<i64>>,
    date: NaiveDate,
    attendance_type: &str,
    actor: &User,
) -> Vec<NotificationDraft> {
    let type_label = attendance_type_label(attendance_type);
    let actor_label = actor.label();
    let date_text = date.to_string();

    let mut drafts = Vec::new();
    for student in students {
        let Some(targets) = recipients.get(&student.id).filter(|r| !r.is_empty()) else {
            continue;
        };
        let name = student.listing_name();

        let mut parts = vec![format!("Alumno: {name}")];
        if !student.course.is_empty() {
            parts.push(format!("Curso: {}", student.course));
        }
        parts.push(format!("Tipo: {type_label}"));
        parts.push(format!("Fecha: {date_text}"));
        parts.push(format!("Registrado por: {actor_label}"));

        let mut meta = base_meta(student);
        meta.insert("fecha".into(), json!(date_text));
        meta.insert("tipo_asistencia".into(), json!(attendance_type));
        let ids: Vec<i64> = records.get(&student.id).map(|r| r.id).into_iter().collect();
        meta.insert(NotificationCategory::Absence.ids_key().into(), json!(ids));

        let text = description(&parts.join(" · "));
        for recipient in targets {
            drafts.push(NotificationDraft {
                recipient_id: *recipient,
                category: NotificationCategory::Absence,
                title: format!("Inasistencia registrada: {name}"),
                description: text.clone(),
                url: Some(student_url(student, "asistencias")),
                meta: serde_json::Value::Object(meta.clone()),
            });
        }
    }
    drafts
}

/// Grades grouped into one notification per (recipient, student).
pub fn grade_drafts(
    grades: &[Grade],
    students: &HashMap<i64, Student>,
    recipients: &HashMap<i64, Vec<i64>>,
    actor: &User,
) -> Vec<NotificationDraft> {
    let mut by_student: BTreeMap<i64, Vec<&Grade>> = BTreeMap::new();
    for grade in grades {
        by_student.entry(grade.student_id).or_default().push(grade);
    }

    let mut drafts = Vec::new();
    for (student_id, student_grades) in by_student {
        let (Some(student), Some(targets)) = (students.get(&student_id), recipients.get(&student_id))
        else {
            continue;
        };
        let name = student.listing_name();
        let title = if student_grades.len() > 1 {
            format!("Nuevas notas para {name}")
        } else {
            format!("Nueva nota para {name}")
        };

        let lines: Vec<String> = student_grades
            .iter()
            .map(|g| format!("• {} ({}): {} — {}", g.subject, g.kind.label(), g.value, g.date))
            .collect();
        let mut text = format!("Se registraron nuevas calificaciones. Alumno: {name}. ");
        if !student.course.is_empty() {
            text.push_str(&format!("Curso: {}. ", student.course));
        }
        text.push_str(&lines.join(" "));
        text.push_str(&format!(" Docente: {}", actor.label()));

        let mut meta = base_meta(student);
        let ids: Vec<i64> = student_grades.iter().map(|g| g.id).collect();
        meta.insert(NotificationCategory::Grade.ids_key().into(), json!(ids));

        let text = description(&text);
        for recipient in targets {
            drafts.push(NotificationDraft {
                recipient_id: *recipient,
                category: NotificationCategory::Grade,
                title: title.clone(),
                description: text.clone(),
                url: Some(student_url(student, "notas")),
                meta: serde_json::Value::Object(meta.clone()),
            });
        }
    }
    drafts
}

pub fn sanction_drafts(
    sanction: &Sanction,
    student: &Student,
    recipients: &[i64],
    actor: &User,
) -> Vec<NotificationDraft> {
    let name = student.listing_name();
    let mut lines = vec![
        "Se registró una sanción disciplinaria.".to_string(),
        format!("Alumno: {name}"),
    ];
    if !student.course.is_empty() {
        lines.push(format!("Curso: {}", student.course));
    }
    lines.push(format!("Tipo: {}", sanction.kind));
    lines.push(format!("Fecha: {}", sanction.date));
    let teacher = sanction
        .teacher_label
        .clone()
        .unwrap_or_else(|| actor.label());
    lines.push(format!("Docente: {teacher}"));
    if let Some(detail) = sanction.detail.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        lines.push(detail.to_string());
    }
    lines.push(format!("Motivo: {}", sanction.reason));

    let mut meta = base_meta(student);
    meta.insert(NotificationCategory::Sanction.ids_key().into(), json!([sanction.id]));
    meta.insert("tipo_sancion".into(), json!(sanction.kind));
    meta.insert("fecha".into(), json!(sanction.date.to_string()));
    meta.insert("docente".into(), json!(teacher));

    let url = format!(
        "{}&mes={}",
        student_url(student, "sanciones"),
        sanction.date.format("%Y-%m")
    );
    let text = description(&lines.join("\n"));

    recipients
        .iter()
        .map(|recipient| NotificationDraft {
            recipient_id: *recipient,
            category: NotificationCategory::Sanction,
            title: format!("Nueva sanción para {name}"),
            description: text.clone(),
            url: Some(url.clone()),
            meta: serde_json::Value::Object(meta.clone()),
        })
        .collect()
}

/// One notification per distinct recipient across the course.
pub fn event_drafts(event: &Event, recipients: &[i64], actor: &User) -> Vec<NotificationDraft> {
    let mut lines = vec![
        format!("Evento: {}", event.title),
        format!("Tipo: {}", event.kind),
        format!("Fecha: {}", event.date),
        format!("Creado por: {}", actor.label()),
    ];
    if let Some(desc) = event.description.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        lines.push(String::new());
        lines.push(desc.to_string());
    }

    let meta = json!({
        "evento_ids": [event.id],
        "curso": event.course,
        "fecha": event.date.to_string(),
        "tipo_evento": event.kind.to_string(),
        "creado_por": actor.label(),
    });
    let text = description(&lines.join("\n"));

    let mut seen = Vec::with_capacity(recipients.len());
    for recipient in recipients {
        if !seen.contains(recipient) {
            seen.push(*recipient);
        }
    }
    seen.into_iter()
        .map(|recipient| NotificationDraft {
            recipient_id: recipient,
            category: NotificationCategory::Event,
            title: format!("Nuevo evento en el calendario ({})", event.course),
            description: text.clone(),
            url: Some("/calendario".to_string()),
            meta: meta.clone(),
        })
        .collect()
}

/// One notification per stored message, addressed to its recipient.
pub fn message_drafts(messages: &[Message], sender: &User) -> Vec<NotificationDraft> {
    let sender_label = sender.label();
    messages
        .iter()
        .map(|message| {
            let subject = message.subject.trim();
            let title = if subject.is_empty() {
                format!("Nuevo mensaje de {sender_label}")
            } else {
                format!("{sender_label}: {subject}")
            };
            let short = if message.content.chars().count() > 160 {
                format!("{}...", truncate_chars(&message.content, 160))
            } else {
                message.content.clone()
            };
            NotificationDraft {
                recipient_id: message.recipient_id,
                category: NotificationCategory::Message,
                title,
                description: description(&short),
                url: Some("/mensajes".to_string()),
                meta: json!({
                    "mensaje_ids": [message.id],
                    "curso": message.course.clone().unwrap_or_default(),
                    "remitente_id": sender.id,
                    "alumno_id": message.student_id,
                }),
            }
        })
        .collect()
}

/// Writes every draft in one insert.
pub async fn dispatch(storage: &Arc<dyn Storage>, drafts: Vec<NotificationDraft>) -> FanoutReport {
    if drafts.is_empty() {
        return FanoutReport::default();
    }
    let category = drafts[0].category;
    match storage.create_notifications(drafts).await {
        Ok(notified) => {
            debug!("Created {} {} notifications", notified, category);
            FanoutReport {
                notified,
                error: None,
            }
        }
        Err(e) => {
            warn!("Notification fanout ({}) failed: {}", category, e);
            FanoutReport::failed(e.to_string())
        }
    }
}

pub async fn notify_absences(
    storage: &Arc<dyn Storage>,
    students: &[&Student],
    records: &HashMap<i64, &AttendanceRecord>,
    date: NaiveDate,
    attendance_type: &str,
    actor: &User,
) -> FanoutReport {
    if students.is_empty() {
        return FanoutReport::default();
    }
    let owned: Vec<Student> = students.iter().map(|s| (*s).clone()).collect();
    let recipients = match recipients_for_students(storage, &owned).await {
        Ok(recipients) => recipients,
        Err(e) => {
            warn!("Failed to resolve absence recipients: {}", e);
            return FanoutReport::failed(e.to_string());
        }
    };
    let drafts = absence_drafts(students, records, &recipients, date, attendance_type, actor);
    dispatch(storage, drafts).await
}

pub async fn notify_grades(
    storage: &Arc<dyn Storage>,
    grades: &[Grade],
    students: &HashMap<i64, Student>,
    actor: &User,
) -> FanoutReport {
    let owned: Vec<Student> = students.values().cloned().collect();
    let recipients = match recipients_for_students(storage, &owned).await {
        Ok(recipients) => recipients,
        Err(e) => {
            warn!("Failed to resolve grade recipients: {}", e);
            return FanoutReport::failed(e.to_string());
        }
    };
    dispatch(storage, grade_drafts(grades, students, &recipients, actor)).await
}

pub async fn notify_sanction(
    storage: &Arc<dyn Storage>,
    sanction: &Sanction,
    student: &Student,
    actor: &User,
) -> FanoutReport {
    let recipients = match recipients_for_students(storage, std::slice::from_ref(student)).await {
        Ok(mut recipients) => recipients.remove(&student.id).unwrap_or_default(),
        Err(e) => {
            warn!("Failed to resolve sanction recipients: {}", e);
            return FanoutReport::failed(e.to_string());
        }
    };
    dispatch(storage, sanction_drafts(sanction, student, &recipients, actor)).await
}

pub async fn notify_event(
    storage: &Arc<dyn Storage>,
    event: &Event,
    roster: &[Student],
    actor: &User,
) -> FanoutReport {
    let recipients = match recipients_for_students(storage, roster).await {
        Ok(recipients) => recipients,
        Err(e) => {
            warn!("Failed to resolve event recipients: {}", e);
            return FanoutReport::failed(e.to_string());
        }
    };
    let flat: Vec<i64> = roster
        .iter()
        .filter_map(|s| recipients.get(&s.id))
        .flatten()
        .copied()
        .collect();
    dispatch(storage, event_drafts(event, &flat, actor)).await
}

pub async fn notify_messages(
    storage: &Arc<dyn Storage>,
    messages: &[Message],
    sender: &User,
) -> FanoutReport {
    dispatch(storage, message_drafts(messages, sender)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grades::entities::GradeKind;
    use crate::models::users::entities::{UserRole, UserStatus};
    use chrono::Utc;

    fn actor() -> User {
        User {
            id: 99,
            username: "prof".to_string(),
            email: None,
            display_name: Some("Prof. Gómez".to_string()),
            role: UserRole::Teacher,
            is_staff: false,
            status: UserStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn student() -> Student {
        Student {
            id: 42,
            enrollment_code: "LEG42".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Paz".to_string(),
            course: "1A".to_string(),
            parent_user_id: Some(7),
            user_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn grade(id: i64, subject: &str) -> Grade {
        Grade {
            id,
            student_id: 42,
            subject: subject.to_string(),
            kind: GradeKind::Evaluacion,
            value: "8".to_string(),
            term: 1,
            date: NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
            created_by: Some(99),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_absence_draft_texts() {
        let student = student();
        let recipients = HashMap::from([(42, vec![7, 8])]);
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let drafts = absence_drafts(&[&student], &HashMap::new(), &recipients, date, "taller", &actor());

        assert_eq!(drafts.len(), 2);
        let draft = &drafts[0];
        assert_eq!(draft.title, "Inasistencia registrada: Paz Ana");
        assert_eq!(
            draft.description,
            "Alumno: Paz Ana · Curso: 1A · Tipo: Taller · Fecha: 2025-03-10 · Registrado por: Prof. Gómez"
        );
        assert_eq!(draft.url.as_deref(), Some("/alumnos/42/?tab=asistencias"));
        assert_eq!(draft.meta["alumno_legajo"], "LEG42");
        assert_eq!(draft.meta["tipo_asistencia"], "taller");
        assert_eq!(draft.meta["fecha"], "2025-03-10");
    }

    #[test]
    fn test_students_without_recipients_are_skipped() {
        let student = student();
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let empty = HashMap::from([(42, Vec::new())]);
        assert!(absence_drafts(&[&student], &HashMap::new(), &empty, date, "clases", &actor()).is_empty());
    }

    #[test]
    fn test_three_grades_make_one_notification() {
        let students = HashMap::from([(42, student())]);
        let recipients = HashMap::from([(42, vec![7])]);
        let grades = vec![grade(1, "Matemática"), grade(2, "Lengua"), grade(3, "Historia")];

        let drafts = grade_drafts(&grades, &students, &recipients, &actor());
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].title, "Nuevas notas para Paz Ana");
        assert_eq!(drafts[0].meta["nota_ids"], json!([1, 2, 3]));
        assert!(drafts[0].description.contains("• Lengua (Evaluación): 8 — 2025-04-02"));

        let single = grade_drafts(&grades[..1], &students, &recipients, &actor());
        assert_eq!(single[0].title, "Nueva nota para Paz Ana");
    }

    #[test]
    fn test_description_is_capped() {
        let students = HashMap::from([(42, student())]);
        let recipients = HashMap::from([(42, vec![7])]);
        let grades: Vec<Grade> = (1..=40).map(|i| grade(i, "Educación Tecnológica")).collect();
        let drafts = grade_drafts(&grades, &students, &recipients, &actor());
        assert_eq!(drafts[0].description.chars().count(), 500);
    }

    #[test]
    fn test_sanction_url_carries_month() {
        let sanction = Sanction {
            id: 5,
            student_id: 42,
            date: NaiveDate::from_ymd_opt(2025, 5, 20).unwrap(),
            kind: "Amonestación".to_string(),
            reason: "Uso del celular".to_string(),
            detail: None,
            teacher_label: None,
            created_by: Some(99),
            created_at: Utc::now(),
        };
        let drafts = sanction_drafts(&sanction, &student(), &[7], &actor());
        assert_eq!(drafts[0].title, "Nueva sanción para Paz Ana");
        assert_eq!(drafts[0].url.as_deref(), Some("/alumnos/42/?tab=sanciones&mes=2025-05"));
        assert!(drafts[0].description.ends_with("Motivo: Uso del celular"));
    }

    #[test]
    fn test_event_recipients_are_deduplicated() {
        let event = Event {
            id: 3,
            title: "Prueba".to_string(),
            description: None,
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            course: "1A".to_string(),
            kind: crate::models::events::entities::EventKind::Evaluacion,
            created_by: Some(99),
            created_at: Utc::now(),
        };
        let drafts = event_drafts(&event, &[7, 8, 7], &actor());
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].title, "Nuevo evento en el calendario (1A)");
    }
}
