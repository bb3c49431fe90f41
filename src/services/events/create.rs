use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::EventService;
use crate::models::courses::entities::normalize_course;
use crate::models::events::entities::{EventKind, NewEvent};
use crate::models::events::requests::CreateEventRequest;
use crate::models::events::responses::EventCreatedResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::course_access::can_access;
use crate::services::notifications::FanoutReport;
use crate::services::notifications::fanout::notify_event;
use crate::services::{bad_request, forbidden, internal_error, require_context};
use crate::utils::validate::parse_iso_date;

pub async fn create_event(
    service: &EventService,
    request: &HttpRequest,
    req: CreateEventRequest,
) -> ActixResult<HttpResponse> {
    let ctx = match require_context(request) {
        Ok(ctx) => ctx,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    let title = req.titulo.trim();
    if title.is_empty() {
        return Ok(bad_request(ErrorCode::EventInvalid, "Falta titulo"));
    }
    let Some(course) = normalize_course(&req.curso) else {
        return Ok(bad_request(
            ErrorCode::CourseInvalid,
            format!("Curso inválido: {}", req.curso),
        ));
    };
    let Some(date) = parse_iso_date(&req.fecha) else {
        return Ok(bad_request(
            ErrorCode::EventInvalid,
            format!("Fecha inválida: {}", req.fecha),
        ));
    };
    let kind = match req.tipo_evento.as_deref() {
        None => EventKind::Otro,
        Some(raw) => match raw.parse::<EventKind>() {
            Ok(kind) => kind,
            Err(_) => {
                return Ok(bad_request(
                    ErrorCode::EventInvalid,
                    format!("Tipo de evento inválido: {raw}"),
                ));
            }
        },
    };

    match can_access(&storage, &ctx.user, course).await {
        Ok(true) => {}
        Ok(false) => {
            return Ok(forbidden(
                ErrorCode::CoursePermissionDenied,
                "No tenés permisos para ese curso.",
            ));
        }
        Err(e) => return Ok(internal_error(format!("Error resolviendo cursos: {e}"))),
    }

    let event = match storage
        .create_event(NewEvent {
            title: title.to_string(),
            description: req
                .descripcion
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            date,
            course: course.to_string(),
            kind,
            created_by: Some(ctx.user_id()),
        })
        .await
    {
        Ok(event) => event,
        Err(e) => return Ok(internal_error(format!("Error guardando el evento: {e}"))),
    };

    let report = match storage.list_students_by_course(course).await {
        Ok(roster) => notify_event(&storage, &event, &roster, &ctx.user).await,
        Err(e) => {
            warn!("Event {} saved but its roster could not be read: {}", event.id, e);
            FanoutReport {
                notified: 0,
                error: Some(e.to_string()),
            }
        }
    };
    info!("User {} created event {} for {}", ctx.user_id(), event.id, course);

    Ok(HttpResponse::Created().json(ApiResponse::success(
        EventCreatedResponse {
            evento: event,
            notificados: report.notified,
            notif_error: report.visible_error(&ctx),
        },
        "Evento creado",
    )))
}
