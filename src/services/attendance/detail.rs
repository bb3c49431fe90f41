use actix_web::http::Method;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Result as ActixResult, web};
use serde_json::Value;

use super::normalize::payload_from_body;
use super::{AttendanceService, load_editable_record};
use crate::config::AppConfig;
use crate::models::attendance::responses::NoteResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{bad_request, internal_error, not_found, require_context};
use crate::utils::text::{scalar_text, truncate_chars};

const NOTE_KEYS: [&str; 4] = ["detalle", "observacion", "observaciones", "comentario"];

/// First non-null note key. `Some("")` clears the note.
fn note_from_payload(payload: &Value) -> Option<String> {
    let value = NOTE_KEYS
        .iter()
        .filter_map(|key| payload.get(*key))
        .find(|value| !value.is_null())?;
    Some(scalar_text(value).unwrap_or_default())
}

pub async fn attendance_detail(
    service: &AttendanceService,
    request: &HttpRequest,
    attendance_id: i64,
    body: web::Bytes,
) -> ActixResult<HttpResponse> {
    let ctx = match require_context(request) {
        Ok(ctx) => ctx,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    let (record, _student) = match load_editable_record(&storage, &ctx, attendance_id).await {
        Ok(found) => found,
        Err(response) => return Ok(response),
    };

    if record.is_plain_presence() {
        return Ok(bad_request(
            ErrorCode::AttendancePlainPresence,
            "Solo se puede cargar detalle en ausentes o tardanzas.",
        ));
    }

    if request.method() == Method::GET {
        return Ok(HttpResponse::Ok().json(ApiResponse::success(NoteResponse::from(&record), "OK")));
    }

    let note = payload_from_body(&request.content_type(), &body)
        .ok()
        .and_then(|payload| note_from_payload(&payload));
    let Some(note) = note else {
        return Ok(bad_request(
            ErrorCode::AttendanceInvalidPayload,
            "Falta 'detalle' (o 'observacion').",
        ));
    };
    let note = truncate_chars(note.trim(), AppConfig::get().attendance.note_max_len);
    let note = (!note.is_empty()).then_some(note);

    match storage.set_attendance_note(attendance_id, note).await {
        Ok(Some(updated)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            NoteResponse::from(&updated),
            "Detalle guardado",
        ))),
        Ok(None) => Ok(not_found(
            ErrorCode::AttendanceRecordNotFound,
            "Asistencia no encontrada.",
        )),
        Err(e) => Ok(internal_error(format!("Error guardando el detalle: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_note_key_priority() {
        assert_eq!(
            note_from_payload(&json!({"observacion": "b", "detalle": "a"})),
            Some("a".to_string())
        );
        assert_eq!(
            note_from_payload(&json!({"detalle": null, "comentario": "c"})),
            Some("c".to_string())
        );
        assert_eq!(note_from_payload(&json!({"observaciones": ""})), Some(String::new()));
        assert_eq!(note_from_payload(&json!({"otro": "x"})), None);
    }
}
