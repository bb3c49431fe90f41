use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::SanctionService;
use crate::models::sanctions::entities::NewSanction;
use crate::models::sanctions::requests::CreateSanctionRequest;
use crate::models::sanctions::responses::SanctionCreatedResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::attendance::normalize::StudentKey;
use crate::services::attendance::register::today;
use crate::services::course_access::can_access;
use crate::services::notifications::fanout::notify_sanction;
use crate::services::students::lookup_students;
use crate::services::{bad_request, forbidden, internal_error, not_found, require_context};
use crate::utils::validate::parse_iso_date;

pub const DEFAULT_SANCTION_KIND: &str = "Amonestación";

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub async fn create_sanction(
    service: &SanctionService,
    request: &HttpRequest,
    req: CreateSanctionRequest,
) -> ActixResult<HttpResponse> {
    let ctx = match require_context(request) {
        Ok(ctx) => ctx,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    let key = match (req.alumno_id, non_empty(req.id_alumno.as_deref())) {
        (Some(id), _) if id > 0 => StudentKey::Id(id),
        (_, Some(code)) => StudentKey::Code(code),
        _ => {
            return Ok(bad_request(
                ErrorCode::SanctionInvalid,
                "Falta alumno_id o id_alumno",
            ));
        }
    };
    let reason = req.motivo.trim();
    if reason.is_empty() {
        return Ok(bad_request(ErrorCode::SanctionInvalid, "Falta motivo"));
    }
    let date = match non_empty(req.fecha.as_deref()) {
        None => today(),
        Some(raw) => match parse_iso_date(&raw) {
            Some(date) => date,
            None => {
                return Ok(bad_request(
                    ErrorCode::SanctionInvalid,
                    format!("Fecha inválida: {raw}"),
                ));
            }
        },
    };

    let student = match lookup_students(&storage, [&key]).await {
        Ok(students) => match students.into_iter().find(|s| key.matches(s)) {
            Some(student) => student,
            None => return Ok(not_found(ErrorCode::StudentNotFound, "Alumno no encontrado.")),
        },
        Err(e) => return Ok(internal_error(format!("Error consultando el alumno: {e}"))),
    };
    match can_access(&storage, &ctx.user, &student.course).await {
        Ok(true) => {}
        Ok(false) => {
            return Ok(forbidden(
                ErrorCode::CoursePermissionDenied,
                "No tenés permisos para ese curso.",
            ));
        }
        Err(e) => return Ok(internal_error(format!("Error resolviendo cursos: {e}"))),
    }

    let new_sanction = NewSanction {
        student_id: student.id,
        date,
        kind: non_empty(req.tipo.as_deref()).unwrap_or_else(|| DEFAULT_SANCTION_KIND.to_string()),
        reason: reason.to_string(),
        detail: non_empty(req.detalle.as_deref()),
        teacher_label: non_empty(req.docente.as_deref()),
        created_by: Some(ctx.user_id()),
    };
    let sanction = match storage.create_sanction(new_sanction).await {
        Ok(sanction) => sanction,
        Err(e) => return Ok(internal_error(format!("Error guardando la sanción: {e}"))),
    };

    let report = notify_sanction(&storage, &sanction, &student, &ctx.user).await;
    info!(
        "User {} created sanction {} for student {}",
        ctx.user_id(),
        sanction.id,
        student.id
    );

    Ok(HttpResponse::Created().json(ApiResponse::success(
        SanctionCreatedResponse {
            sancion: sanction,
            notificados: report.notified,
            notif_error: report.visible_error(&ctx),
        },
        "Sanción registrada",
    )))
}
