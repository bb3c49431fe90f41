//! Field validation shared by single and bulk grade creation.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde_json::Value;

use crate::models::grades::entities::{GradeKind, NewGrade};
use crate::models::grades::requests::CreateGradeRequest;
use crate::models::students::entities::Student;
use crate::services::attendance::normalize::StudentKey;
use crate::services::course_access::CourseScope;
use crate::utils::text::scalar_text;
use crate::utils::validate::{parse_iso_date, validate_grade_value, validate_term};

/// Validated fields, student not resolved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeInput {
    pub key: StudentKey,
    pub subject: String,
    pub kind: GradeKind,
    pub value: String,
    pub term: i16,
    pub date: NaiveDate,
}

impl GradeInput {
    pub fn into_new_grade(self, student_id: i64, created_by: i64) -> NewGrade {
        NewGrade {
            student_id,
            subject: self.subject,
            kind: self.kind,
            value: self.value,
            term: self.term,
            date: self.date,
            created_by: Some(created_by),
        }
    }
}

pub fn validate_grade(req: &CreateGradeRequest, today: NaiveDate) -> Result<GradeInput, String> {
    let key = match (req.alumno_id, req.id_alumno.as_deref().map(str::trim)) {
        (Some(id), _) if id > 0 => StudentKey::Id(id),
        (_, Some(code)) if !code.is_empty() => StudentKey::Code(code.to_string()),
        _ => return Err("Falta alumno_id o id_alumno".to_string()),
    };

    let subject = req.materia.trim();
    if subject.is_empty() {
        return Err("Falta materia".to_string());
    }

    let kind: GradeKind = req
        .tipo
        .parse()
        .map_err(|_| format!("Tipo de nota inválido: {}", req.tipo))?;

    let raw_value = scalar_text(&req.calificacion).ok_or("Falta calificación")?;
    let value = validate_grade_value(&raw_value)?;

    let term = scalar_text(&req.cuatrimestre)
        .and_then(|raw| raw.parse::<i64>().ok())
        .ok_or("Cuatrimestre inválido: debe ser 1 o 2")
        .and_then(validate_term)?;

    let date = match req.fecha.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => today,
        Some(raw) => parse_iso_date(raw).ok_or_else(|| format!("Fecha inválida: {raw}"))?,
    };

    Ok(GradeInput {
        key,
        subject: subject.to_string(),
        kind,
        value,
        term,
        date,
    })
}

/// Parses one raw bulk entry.
pub fn validate_raw_grade(raw: Value, today: NaiveDate) -> Result<GradeInput, String> {
    let req: CreateGradeRequest =
        serde_json::from_value(raw).map_err(|e| format!("Nota inválida: {e}"))?;
    validate_grade(&req, today)
}

/// Finds the student of `key` and checks the caller's course scope.
pub fn resolve_student<'a>(
    key: &StudentKey,
    students: &'a HashMap<i64, Student>,
    scope: &CourseScope,
) -> Result<&'a Student, String> {
    let student = students
        .values()
        .find(|student| key.matches(student))
        .ok_or("Alumno no encontrado")?;
    if !scope.allows(&student.course) {
        return Err("No tenés permisos para ese curso.".to_string());
    }
    Ok(student)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 2).unwrap()
    }

    #[test]
    fn test_valid_grade() {
        let input = validate_raw_grade(
            json!({"alumno_id": 4, "materia": " Lengua ", "tipo": "TP", "calificacion": 9, "cuatrimestre": "2"}),
            today(),
        )
        .unwrap();
        assert_eq!(input.key, StudentKey::Id(4));
        assert_eq!(input.subject, "Lengua");
        assert_eq!(input.kind, GradeKind::Tp);
        assert_eq!(input.value, "9");
        assert_eq!(input.term, 2);
        assert_eq!(input.date, today());
    }

    #[test]
    fn test_invalid_grades() {
        let base = json!({"id_alumno": "LEG1", "materia": "Lengua", "tipo": "oral", "calificacion": "tea", "cuatrimestre": 1});
        assert!(validate_raw_grade(base.clone(), today()).is_ok());

        let mut bad = base.clone();
        bad["calificacion"] = json!(11);
        assert!(validate_raw_grade(bad, today()).unwrap_err().contains("Calificación"));

        let mut bad = base.clone();
        bad["cuatrimestre"] = json!(3);
        assert!(validate_raw_grade(bad, today()).unwrap_err().contains("Cuatrimestre"));

        let mut bad = base.clone();
        bad["tipo"] = json!("concepto");
        assert!(validate_raw_grade(bad, today()).is_err());

        let mut bad = base;
        bad["id_alumno"] = json!("");
        assert_eq!(
            validate_raw_grade(bad, today()).unwrap_err(),
            "Falta alumno_id o id_alumno"
        );

        assert!(validate_raw_grade(json!("nota"), today()).is_err());
    }
}
