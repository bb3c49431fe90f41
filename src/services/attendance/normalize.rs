//! Registration payload parsing.
//!
//! Clients send attendance in three shapes (a student map, id lists, or a
//! list of items), as JSON or as a urlencoded form. Everything is parsed once
//! into an [`AttendanceSubmission`]; resolving keys against the roster
//! happens afterwards in the registration handler.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use actix_web::web;
use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::models::attendance::entities::AttendanceStatus;
use crate::models::courses::entities::normalize_course;
use crate::models::students::entities::Student;
use crate::utils::text::{
    decode_embedded_json, first_scalar, is_truthy, normalize_word, parse_bool_word,
    parse_loose_bool, scalar_text,
};
use crate::utils::validate::parse_iso_date;

const LATE_WORDS: [&str; 7] = [
    "tarde",
    "late",
    "l",
    "lt",
    "llegotarde",
    "llego_tarde",
    "llego tarde",
];
const PRESENT_WORDS: [&str; 4] = ["presente", "p", "ok", "asistio"];
const ABSENT_WORDS: [&str; 4] = ["ausente", "a", "falto", "absent"];
/// Item statuses that only mean "not on time" in the item shape.
const ITEM_ABSENT_WORDS: [&str; 5] = ["inasistente", "ausente", "falta", "tarde", "justificada"];

const MAP_KEYS: [&str; 2] = ["asistencias", "asistenciasPayload"];
const PRESENT_LIST_KEYS: [&str; 3] = ["presentes", "presentes_ids", "presentesId"];
const LATE_LIST_KEYS: [&str; 3] = ["tardes", "tardes_ids", "tardesId"];
const ENVELOPE_KEYS: [&str; 3] = ["payload", "body", "json"];
const ITEM_LIST_KEYS: [&str; 7] = [
    "items",
    "asistencias",
    "data",
    "rows",
    "registros",
    "seleccion",
    "selection",
];
const SINGLE_ITEM_KEYS: [&str; 3] = ["item", "asistencia", "registro"];
const STUDENT_KEYS: [&str; 4] = ["alumno_id", "alumno", "id_alumno", "legajo"];
const TYPE_KEYS: [&str; 3] = ["tipo_asistencia", "tipo", "materia"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    MissingCourse,
    MissingType,
    UnknownCourse(String),
    InvalidDate(String),
    Empty,
    InvalidBody,
}

impl NormalizeError {
    pub fn message(&self) -> String {
        match self {
            NormalizeError::MissingCourse => "Falta curso".to_string(),
            NormalizeError::MissingType => "Falta tipo_asistencia/tipo".to_string(),
            NormalizeError::UnknownCourse(course) => format!("Curso inválido: {course}"),
            NormalizeError::InvalidDate(raw) => {
                format!("Fecha inválida: {raw} (use AAAA-MM-DD)")
            }
            NormalizeError::Empty => "Falta 'asistencias', 'presentes' o 'items'.".to_string(),
            NormalizeError::InvalidBody => "Cuerpo de la solicitud inválido".to_string(),
        }
    }
}

/// Reference to a student as written by the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StudentKey {
    Id(i64),
    /// Enrollment code, matched case-insensitively.
    Code(String),
}

impl StudentKey {
    /// Digits are primary keys, anything else is an enrollment code.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if raw.chars().all(|c| c.is_ascii_digit()) {
            raw.parse().ok().map(StudentKey::Id)
        } else {
            Some(StudentKey::Code(raw.to_string()))
        }
    }

    pub fn matches(&self, student: &Student) -> bool {
        match self {
            StudentKey::Id(id) => student.id == *id,
            StudentKey::Code(code) => student.enrollment_code.eq_ignore_ascii_case(code),
        }
    }
}

/// Course, date and type shared by a map or list submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchHeader {
    /// Catalog code.
    pub course: &'static str,
    /// `None` means today.
    pub date: Option<NaiveDate>,
    pub attendance_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionItem {
    pub key: StudentKey,
    pub date: Option<NaiveDate>,
    pub attendance_type: Option<String>,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttendanceSubmission {
    /// `{curso, asistencias: {key: status}}`.
    StudentMap {
        header: BatchHeader,
        entries: Vec<(StudentKey, AttendanceStatus)>,
        /// Keys that could not be read at all.
        invalid: usize,
    },
    /// `{curso, presentes: [ids], tardes: [ids]}`, applied to the whole roster.
    IdLists {
        header: BatchHeader,
        present: BTreeSet<i64>,
        late: BTreeSet<i64>,
    },
    /// Self-contained items, each possibly with its own date and type.
    Items {
        items: Vec<SubmissionItem>,
        /// Entries without a usable student, date or status.
        invalid: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRegistration {
    pub submission: AttendanceSubmission,
    pub return_items: bool,
}

/// Turns urlencoded pairs into a JSON object. Repeated keys become arrays.
pub fn form_to_value(pairs: Vec<(String, String)>) -> Value {
    let mut map = Map::new();
    for (key, value) in pairs {
        match map.get_mut(&key) {
            Some(Value::Array(values)) => values.push(Value::String(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
            None => {
                map.insert(key, Value::String(value));
            }
        }
    }
    Value::Object(map)
}

/// Request body as JSON. Urlencoded forms are accepted as well; a body
/// without content type is tried as JSON first.
pub fn payload_from_body(content_type: &str, body: &[u8]) -> Result<Value, NormalizeError> {
    let text = std::str::from_utf8(body).map_err(|_| NormalizeError::InvalidBody)?;
    let text = text.trim();
    if text.is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    let as_form = |text: &str| {
        web::Query::<Vec<(String, String)>>::from_query(text)
            .map(|pairs| form_to_value(pairs.into_inner()))
            .map_err(|_| NormalizeError::InvalidBody)
    };

    if content_type.contains("application/x-www-form-urlencoded") {
        as_form(text)
    } else if content_type.contains("json") {
        serde_json::from_str(text).map_err(|_| NormalizeError::InvalidBody)
    } else {
        serde_json::from_str(text).or_else(|_| as_form(text))
    }
}

fn field<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| !value.is_null())
}

fn text_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find_map(scalar_text)
}

fn date_field(map: &Map<String, Value>) -> Result<Option<NaiveDate>, NormalizeError> {
    match text_field(map, &["fecha", "date"]) {
        None => Ok(None),
        Some(raw) => parse_iso_date(&raw)
            .map(Some)
            .ok_or(NormalizeError::InvalidDate(raw)),
    }
}

fn header(map: &Map<String, Value>) -> Result<BatchHeader, NormalizeError> {
    let course_raw = text_field(map, &["curso"]).ok_or(NormalizeError::MissingCourse)?;
    let attendance_type = text_field(map, &TYPE_KEYS).ok_or(NormalizeError::MissingType)?;
    let course =
        normalize_course(&course_raw).ok_or(NormalizeError::UnknownCourse(course_raw))?;
    Ok(BatchHeader {
        course,
        date: date_field(map)?,
        attendance_type,
    })
}

fn in_family(word: &str, family: &[&str]) -> bool {
    family.contains(&word)
}

fn status_from_word(word: &str) -> Option<AttendanceStatus> {
    let word = normalize_word(word);
    if in_family(&word, &LATE_WORDS) {
        return Some(AttendanceStatus::late());
    }
    if in_family(&word, &PRESENT_WORDS) {
        return Some(AttendanceStatus::on_time());
    }
    if in_family(&word, &ABSENT_WORDS) {
        return Some(AttendanceStatus::absent());
    }
    parse_bool_word(&word).map(|present| AttendanceStatus::new(present, false))
}

fn status_from_object(map: &Map<String, Value>) -> Option<AttendanceStatus> {
    let word = ["estado", "status", "tipo"]
        .iter()
        .filter_map(|key| map.get(*key))
        .find_map(|value| value.as_str())
        .map(normalize_word)
        .unwrap_or_default();

    if in_family(&word, &LATE_WORDS) {
        return Some(AttendanceStatus::late());
    }
    if in_family(&word, &PRESENT_WORDS) {
        let late = map.get("tarde").and_then(parse_loose_bool).unwrap_or(false);
        return Some(AttendanceStatus::new(true, late));
    }
    if in_family(&word, &ABSENT_WORDS) || word == "no" {
        return Some(AttendanceStatus::absent());
    }

    let mut present = map.get("presente").and_then(parse_loose_bool);
    let late = map.get("tarde").and_then(parse_loose_bool);
    if present.is_none() {
        present = map
            .get("inasistente")
            .and_then(parse_loose_bool)
            .map(|absent| !absent);
    }
    if present.is_none() && late.is_none() {
        return None;
    }
    Some(AttendanceStatus::new(
        present.unwrap_or(true),
        late.unwrap_or(false),
    ))
}

/// Resolves one status value. `None` when the value carries no information
/// (`null`, or an object without any known field).
pub fn parse_status(value: &Value) -> Option<AttendanceStatus> {
    match value {
        Value::Null => None,
        Value::Object(map) => status_from_object(map),
        Value::String(s) => match status_from_word(s) {
            Some(status) => Some(status),
            None => Some(AttendanceStatus::new(!s.is_empty(), false)),
        },
        other => match parse_loose_bool(other) {
            Some(present) => Some(AttendanceStatus::new(present, false)),
            None => Some(AttendanceStatus::new(is_truthy(other), false)),
        },
    }
}

/// Item shape: the generic rules first, then the item-only fields.
fn parse_item_status(item: &Map<String, Value>) -> Option<AttendanceStatus> {
    if let Some(status) = status_from_object(item) {
        return Some(status);
    }

    let word = ["estado", "tipo", "tipo_asistencia"]
        .iter()
        .filter_map(|key| item.get(*key))
        .find_map(|value| value.as_str())
        .map(normalize_word)
        .unwrap_or_default();

    let present = if in_family(&word, &PRESENT_WORDS) {
        true
    } else if in_family(&word, &ITEM_ABSENT_WORDS) {
        false
    } else {
        return None;
    };
    Some(AttendanceStatus::new(present, false))
}

fn id_list(value: Option<&Value>) -> BTreeSet<i64> {
    let Some(value) = value else {
        return BTreeSet::new();
    };
    let values = match decode_embedded_json(value.clone()) {
        Value::Array(values) => values,
        Value::String(s) if s.contains(',') => s
            .split(',')
            .map(|part| Value::String(part.to_string()))
            .collect(),
        Value::Null => Vec::new(),
        scalar => vec![scalar],
    };
    values
        .into_iter()
        .map(decode_embedded_json)
        .filter_map(|v| match v {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .collect()
}

fn objects_of(value: Value) -> Vec<Value> {
    match decode_embedded_json(value) {
        Value::Array(values) => values
            .into_iter()
            .map(decode_embedded_json)
            .filter(Value::is_object)
            .collect(),
        object @ Value::Object(_) => vec![object],
        _ => Vec::new(),
    }
}

/// Item candidates in the first place they are found.
fn extract_items(payload: &Value) -> Vec<Value> {
    let map = match payload {
        Value::Array(_) => return objects_of(payload.clone()),
        Value::Object(map) => map,
        _ => return Vec::new(),
    };

    for key in ENVELOPE_KEYS {
        if let Some(nested) = map.get(key) {
            let items = extract_items(&decode_embedded_json(nested.clone()));
            if !items.is_empty() {
                return items;
            }
        }
    }
    for key in ITEM_LIST_KEYS.iter().chain(SINGLE_ITEM_KEYS.iter()) {
        if let Some(value) = map.get(*key) {
            return objects_of(value.clone());
        }
    }
    if STUDENT_KEYS.iter().any(|key| map.contains_key(*key)) {
        return vec![payload.clone()];
    }
    Vec::new()
}

fn item_key(item: &Map<String, Value>) -> Option<StudentKey> {
    if let Some(raw) = text_field(item, &["alumno_id", "alumno"]) {
        return raw.parse().ok().map(StudentKey::Id);
    }
    text_field(item, &["id_alumno", "legajo"]).map(StudentKey::Code)
}

fn parse_items(payload: &Value) -> Result<AttendanceSubmission, NormalizeError> {
    let candidates = extract_items(payload);
    if candidates.is_empty() {
        return Err(NormalizeError::Empty);
    }

    let (global_date, global_type) = match payload {
        Value::Object(map) => (
            date_field(map)?,
            text_field(map, &TYPE_KEYS),
        ),
        _ => (None, None),
    };

    let mut items = Vec::with_capacity(candidates.len());
    let mut invalid = 0;
    for candidate in candidates {
        let Value::Object(item) = candidate else {
            invalid += 1;
            continue;
        };
        let (Some(key), Some(status)) = (item_key(&item), parse_item_status(&item)) else {
            invalid += 1;
            continue;
        };
        let date = match date_field(&item) {
            Ok(date) => date.or(global_date),
            Err(_) => {
                invalid += 1;
                continue;
            }
        };
        items.push(SubmissionItem {
            key,
            date,
            attendance_type: text_field(&item, &TYPE_KEYS).or_else(|| global_type.clone()),
            status,
        });
    }

    Ok(AttendanceSubmission::Items { items, invalid })
}

fn unwrap_envelope(payload: Value) -> Value {
    let Value::Object(map) = &payload else {
        return payload;
    };
    let has_shape = MAP_KEYS
        .iter()
        .chain(PRESENT_LIST_KEYS.iter())
        .chain(ITEM_LIST_KEYS.iter())
        .chain(STUDENT_KEYS.iter())
        .any(|key| map.contains_key(*key));
    if has_shape {
        return payload;
    }
    for key in ENVELOPE_KEYS {
        if let Some(nested) = map.get(key) {
            let nested = decode_embedded_json(nested.clone());
            if nested.is_object() || nested.is_array() {
                return nested;
            }
        }
    }
    payload
}

impl AttendanceSubmission {
    /// Picks the shape in priority order: student map, id lists, items.
    pub fn from_payload(payload: Value) -> Result<ParsedRegistration, NormalizeError> {
        let payload = unwrap_envelope(decode_embedded_json(payload));
        let return_items = payload
            .get("return_items")
            .and_then(first_scalar)
            .and_then(parse_loose_bool)
            .unwrap_or(false);

        if let Value::Object(map) = &payload {
            let student_map = field(map, &MAP_KEYS)
                .map(|value| decode_embedded_json(value.clone()))
                .and_then(|value| match value {
                    Value::Object(entries) => Some(entries),
                    _ => None,
                });

            if let Some(raw_entries) = student_map {
                let header = header(map)?;
                let mut entries = Vec::with_capacity(raw_entries.len());
                let mut invalid = 0;
                for (raw_key, raw_status) in raw_entries {
                    let Some(key) = StudentKey::parse(&raw_key) else {
                        invalid += 1;
                        continue;
                    };
                    let raw_status = decode_embedded_json(raw_status);
                    let status = parse_status(&raw_status)
                        .unwrap_or_else(|| AttendanceStatus::new(is_truthy(&raw_status), false));
                    entries.push((key, status));
                }
                return Ok(ParsedRegistration {
                    submission: AttendanceSubmission::StudentMap {
                        header,
                        entries,
                        invalid,
                    },
                    return_items,
                });
            }

            if PRESENT_LIST_KEYS.iter().any(|key| map.contains_key(*key)) {
                let header = header(map)?;
                return Ok(ParsedRegistration {
                    submission: AttendanceSubmission::IdLists {
                        header,
                        present: id_list(field(map, &PRESENT_LIST_KEYS)),
                        late: id_list(field(map, &LATE_LIST_KEYS)),
                    },
                    return_items,
                });
            }
        }

        Ok(ParsedRegistration {
            submission: parse_items(&payload)?,
            return_items,
        })
    }
}

/// Matches map keys against the students found for them, keeping only
/// students of `course`. Returns the statuses by student id and the number of
/// keys left unresolved.
pub fn resolve_student_map(
    entries: &[(StudentKey, AttendanceStatus)],
    students: &[Student],
    course: &str,
) -> (BTreeMap<i64, AttendanceStatus>, usize) {
    let in_course: Vec<&Student> = students.iter().filter(|s| s.course == course).collect();
    let by_id: HashMap<i64, &Student> = in_course.iter().map(|s| (s.id, *s)).collect();
    let by_code: HashMap<String, &Student> = in_course
        .iter()
        .map(|s| (s.enrollment_code.to_lowercase(), *s))
        .collect();

    let mut statuses = BTreeMap::new();
    let mut unresolved = 0;
    for (key, status) in entries {
        let student = match key {
            StudentKey::Id(id) => by_id.get(id),
            StudentKey::Code(code) => by_code.get(&code.to_lowercase()),
        };
        match student {
            Some(student) => {
                statuses.insert(student.id, *status);
            }
            None => unresolved += 1,
        }
    }
    (statuses, unresolved)
}

/// Whole-roster statuses for the id-list shape.
pub fn roster_statuses(
    roster: &[Student],
    present: &BTreeSet<i64>,
    late: &BTreeSet<i64>,
) -> BTreeMap<i64, AttendanceStatus> {
    roster
        .iter()
        .map(|student| {
            let is_late = late.contains(&student.id);
            let is_present = is_late || present.contains(&student.id);
            (student.id, AttendanceStatus::new(is_present, is_late))
        })
        .collect()
}

/// Splits keys into primary keys and enrollment codes for bulk lookup.
pub fn split_keys<'a, I>(keys: I) -> (Vec<i64>, Vec<String>)
where
    I: IntoIterator<Item = &'a StudentKey>,
{
    let mut ids = Vec::new();
    let mut codes = Vec::new();
    for key in keys {
        match key {
            StudentKey::Id(id) => ids.push(*id),
            StudentKey::Code(code) => codes.push(code.clone()),
        }
    }
    ids.sort_unstable();
    ids.dedup();
    codes.sort();
    codes.dedup();
    (ids, codes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn student(id: i64, code: &str, course: &str) -> Student {
        Student {
            id,
            enrollment_code: code.to_string(),
            first_name: "N".to_string(),
            last_name: "A".to_string(),
            course: course.to_string(),
            parent_user_id: None,
            user_id: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_status_families() {
        for word in ["tarde", "Llegó Tarde", "LT", "llego_tarde", "late"] {
            assert_eq!(parse_status(&json!(word)), Some(AttendanceStatus::late()), "{word}");
        }
        for word in ["presente", "P", "ok", "Asistió", "sí", "1", "on"] {
            assert_eq!(parse_status(&json!(word)), Some(AttendanceStatus::on_time()), "{word}");
        }
        for word in ["ausente", "A", "faltó", "no", "0", "off", "absent"] {
            assert_eq!(parse_status(&json!(word)), Some(AttendanceStatus::absent()), "{word}");
        }
    }

    #[test]
    fn test_status_words_with_combining_accents() {
        assert_eq!(parse_status(&json!("falto\u{301}")), Some(AttendanceStatus::absent()));
        assert_eq!(parse_status(&json!("Llego\u{301} tarde")), Some(AttendanceStatus::late()));
        assert_eq!(parse_status(&json!("Asistio\u{301}")), Some(AttendanceStatus::on_time()));
    }

    #[test]
    fn test_status_scalars_and_truthiness() {
        assert_eq!(parse_status(&json!(true)), Some(AttendanceStatus::on_time()));
        assert_eq!(parse_status(&json!(0)), Some(AttendanceStatus::absent()));
        assert_eq!(parse_status(&json!(5)), Some(AttendanceStatus::on_time()));
        assert_eq!(parse_status(&json!("cualquiera")), Some(AttendanceStatus::on_time()));
        assert_eq!(parse_status(&json!("")), Some(AttendanceStatus::absent()));
        assert_eq!(parse_status(&json!([])), Some(AttendanceStatus::absent()));
        assert_eq!(parse_status(&Value::Null), None);
    }

    #[test]
    fn test_status_objects() {
        assert_eq!(
            parse_status(&json!({"estado": "tarde"})),
            Some(AttendanceStatus::late())
        );
        assert_eq!(
            parse_status(&json!({"estado": "presente", "tarde": "si"})),
            Some(AttendanceStatus::late())
        );
        assert_eq!(
            parse_status(&json!({"tarde": true})),
            Some(AttendanceStatus::late())
        );
        assert_eq!(
            parse_status(&json!({"presente": false, "tarde": true})),
            Some(AttendanceStatus::absent())
        );
        assert_eq!(
            parse_status(&json!({"inasistente": "true"})),
            Some(AttendanceStatus::absent())
        );
        assert_eq!(parse_status(&json!({"otro": 1})), None);
    }

    #[test]
    fn test_map_form() {
        let parsed = AttendanceSubmission::from_payload(json!({
            "curso": "1a",
            "fecha": "2025-03-10",
            "tipo": "clases",
            "asistencias": {"418": true, "LEG-9": "ausente", " ": true}
        }))
        .unwrap();

        let AttendanceSubmission::StudentMap { header, entries, invalid } = parsed.submission
        else {
            panic!("expected map form");
        };
        assert_eq!(header.course, "1A");
        assert_eq!(header.date, NaiveDate::from_ymd_opt(2025, 3, 10));
        assert_eq!(header.attendance_type, "clases");
        assert_eq!(invalid, 1);
        assert!(entries.contains(&(StudentKey::Id(418), AttendanceStatus::on_time())));
        assert!(entries.contains(&(
            StudentKey::Code("LEG-9".to_string()),
            AttendanceStatus::absent()
        )));
        assert!(!parsed.return_items);
    }

    #[test]
    fn test_map_form_errors() {
        let missing_course =
            AttendanceSubmission::from_payload(json!({"tipo": "clases", "asistencias": {}}));
        assert_eq!(missing_course.unwrap_err(), NormalizeError::MissingCourse);

        let missing_type =
            AttendanceSubmission::from_payload(json!({"curso": "1A", "asistencias": {}}));
        assert_eq!(missing_type.unwrap_err().message(), "Falta tipo_asistencia/tipo");

        let unknown = AttendanceSubmission::from_payload(
            json!({"curso": "9Z", "tipo": "clases", "asistencias": {}}),
        );
        assert_eq!(unknown.unwrap_err(), NormalizeError::UnknownCourse("9Z".to_string()));

        let bad_date = AttendanceSubmission::from_payload(
            json!({"curso": "1A", "tipo": "clases", "fecha": "10/03/2025", "asistencias": {}}),
        );
        assert!(matches!(bad_date.unwrap_err(), NormalizeError::InvalidDate(_)));
    }

    #[test]
    fn test_form_encoded_map_and_lists() {
        let payload = form_to_value(vec![
            ("curso".to_string(), "3B".to_string()),
            ("tipo_asistencia".to_string(), "taller".to_string()),
            ("asistencias".to_string(), "{\"7\": \"tarde\"}".to_string()),
            ("return_items".to_string(), "1".to_string()),
        ]);
        let parsed = AttendanceSubmission::from_payload(payload).unwrap();
        assert!(parsed.return_items);
        assert!(matches!(
            parsed.submission,
            AttendanceSubmission::StudentMap { ref entries, .. }
                if entries == &vec![(StudentKey::Id(7), AttendanceStatus::late())]
        ));

        let payload = form_to_value(vec![
            ("curso".to_string(), "3B".to_string()),
            ("tipo".to_string(), "clases".to_string()),
            ("presentes".to_string(), "1".to_string()),
            ("presentes".to_string(), "2".to_string()),
            ("tardes".to_string(), "[3]".to_string()),
        ]);
        let parsed = AttendanceSubmission::from_payload(payload).unwrap();
        let AttendanceSubmission::IdLists { present, late, .. } = parsed.submission else {
            panic!("expected id lists");
        };
        assert_eq!(present, BTreeSet::from([1, 2]));
        assert_eq!(late, BTreeSet::from([3]));
    }

    #[test]
    fn test_item_form_and_envelopes() {
        let parsed = AttendanceSubmission::from_payload(json!({
            "payload": "{\"fecha\": \"2025-03-11\", \"items\": [{\"alumno_id\": 5, \"estado\": \"ausente\"}, {\"legajo\": \"X1\", \"presente\": \"no\", \"tipo\": \"taller\"}, {\"alumno_id\": 6}, \"basura\"]}"
        }))
        .unwrap();

        let AttendanceSubmission::Items { items, invalid } = parsed.submission else {
            panic!("expected items");
        };
        assert_eq!(invalid, 1);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].key, StudentKey::Id(5));
        assert_eq!(items[0].date, NaiveDate::from_ymd_opt(2025, 3, 11));
        assert_eq!(items[0].status, AttendanceStatus::absent());
        assert_eq!(items[1].key, StudentKey::Code("X1".to_string()));
        assert_eq!(items[1].attendance_type.as_deref(), Some("taller"));
    }

    #[test]
    fn test_item_only_words() {
        let parsed = AttendanceSubmission::from_payload(
            json!([{"alumno": "4", "estado": "justificada"}]),
        )
        .unwrap();
        let AttendanceSubmission::Items { items, .. } = parsed.submission else {
            panic!("expected items");
        };
        assert_eq!(items[0].status, AttendanceStatus::absent());
    }

    #[test]
    fn test_bare_item_and_empty_payload() {
        let parsed =
            AttendanceSubmission::from_payload(json!({"id_alumno": "A7", "presente": true}))
                .unwrap();
        assert!(matches!(
            parsed.submission,
            AttendanceSubmission::Items { ref items, invalid: 0 } if items.len() == 1
        ));

        let err = AttendanceSubmission::from_payload(json!({"curso": "1A"})).unwrap_err();
        assert_eq!(err, NormalizeError::Empty);
    }

    #[test]
    fn test_resolve_student_map_filters_course() {
        let students = vec![
            student(1, "Leg01", "1A"),
            student(2, "LEG02", "1A"),
            student(3, "LEG03", "2B"),
        ];
        let entries = vec![
            (StudentKey::Id(1), AttendanceStatus::on_time()),
            (StudentKey::Code("leg02".to_string()), AttendanceStatus::absent()),
            (StudentKey::Id(3), AttendanceStatus::on_time()),
            (StudentKey::Code("nadie".to_string()), AttendanceStatus::on_time()),
        ];
        let (statuses, unresolved) = resolve_student_map(&entries, &students, "1A");
        assert_eq!(unresolved, 2);
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[&2], AttendanceStatus::absent());
    }

    #[test]
    fn test_roster_statuses() {
        let roster = vec![student(1, "a", "1A"), student(2, "b", "1A"), student(3, "c", "1A")];
        let statuses = roster_statuses(&roster, &BTreeSet::from([1]), &BTreeSet::from([2]));
        assert_eq!(statuses[&1], AttendanceStatus::on_time());
        assert_eq!(statuses[&2], AttendanceStatus::late());
        assert_eq!(statuses[&3], AttendanceStatus::absent());
    }

    #[test]
    fn test_payload_from_body() {
        let form = payload_from_body(
            "application/x-www-form-urlencoded",
            b"curso=1A&presentes=1&presentes=2&tipo=clases",
        )
        .unwrap();
        assert_eq!(form["curso"], "1A");
        assert_eq!(form["presentes"], json!(["1", "2"]));

        let body = payload_from_body("application/json", br#"{"curso": "1A"}"#).unwrap();
        assert_eq!(body["curso"], "1A");

        let sniffed = payload_from_body("", b"justificada=true").unwrap();
        assert_eq!(sniffed["justificada"], "true");

        assert_eq!(payload_from_body("application/json", b"{oops"), Err(NormalizeError::InvalidBody));
        assert_eq!(payload_from_body("application/json", b"  ").unwrap(), json!({}));
    }

    #[test]
    fn test_student_key_parse() {
        assert_eq!(StudentKey::parse(" 42 "), Some(StudentKey::Id(42)));
        assert_eq!(StudentKey::parse("A-1"), Some(StudentKey::Code("A-1".to_string())));
        assert_eq!(StudentKey::parse(""), None);
    }
}
