use actix_web::http::Method;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Result as ActixResult, web};
use tracing::info;

use super::normalize::payload_from_body;
use super::{AttendanceService, load_editable_record};
use crate::errors::BoletinError;
use crate::models::attendance::responses::JustificationResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{bad_request, internal_error, not_found, require_context};
use crate::utils::text::parse_loose_bool;

const PLAIN_PRESENCE: &str = "No se puede justificar un presente.";

/// `GET` reads the state; other methods set `justificada` or toggle it when
/// the body does not say.
pub async fn justify_attendance(
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

    if request.method() == Method::GET {
        return Ok(HttpResponse::Ok().json(ApiResponse::success(
            JustificationResponse::from(&record),
            "OK",
        )));
    }

    if record.is_plain_presence() {
        return Ok(bad_request(ErrorCode::AttendancePlainPresence, PLAIN_PRESENCE));
    }

    let requested = payload_from_body(&request.content_type(), &body)
        .ok()
        .and_then(|payload| payload.get("justificada").and_then(parse_loose_bool));
    let justified = requested.unwrap_or(!record.justified);

    match storage
        .set_attendance_justified(attendance_id, justified)
        .await
    {
        Ok(Some(updated)) => {
            info!(
                "User {} set attendance {} justified={}",
                ctx.user_id(),
                attendance_id,
                justified
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                JustificationResponse::from(&updated),
                "Asistencia actualizada",
            )))
        }
        Ok(None) => Ok(not_found(
            ErrorCode::AttendanceRecordNotFound,
            "Asistencia no encontrada.",
        )),
        Err(BoletinError::Validation(_)) => {
            Ok(bad_request(ErrorCode::AttendancePlainPresence, PLAIN_PRESENCE))
        }
        Err(e) => Ok(internal_error(format!("Error actualizando la asistencia: {e}"))),
    }
}
