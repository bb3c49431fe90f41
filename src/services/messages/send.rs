use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::MessageService;
use crate::models::messages::entities::NewMessage;
use crate::models::messages::requests::SendMessageRequest;
use crate::models::messages::responses::MessagesSentResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::attendance::normalize::StudentKey;
use crate::services::course_access::can_access;
use crate::services::notifications::fanout::notify_messages;
use crate::services::notifications::recipients::recipients_for_students;
use crate::services::students::lookup_students;
use crate::services::{bad_request, forbidden, internal_error, not_found, require_context};

/// Direct message to `receptor_id`, or one copy per recipient of a student.
pub async fn send_message(
    service: &MessageService,
    request: &HttpRequest,
    req: SendMessageRequest,
) -> ActixResult<HttpResponse> {
    let ctx = match require_context(request) {
        Ok(ctx) => ctx,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    let subject = req.asunto.trim().to_string();
    let content = req.contenido.trim().to_string();
    if content.is_empty() {
        return Ok(bad_request(ErrorCode::MessageInvalid, "Falta contenido"));
    }

    let student_key = match (req.alumno_id, req.id_alumno.as_deref().map(str::trim)) {
        (Some(id), _) if id > 0 => Some(StudentKey::Id(id)),
        (_, Some(code)) if !code.is_empty() => Some(StudentKey::Code(code.to_string())),
        _ => None,
    };

    let new_messages: Vec<NewMessage> = match (req.receptor_id, student_key) {
        (Some(receptor_id), _) => {
            match storage.get_user_by_id(receptor_id).await {
                Ok(Some(_)) => {}
                Ok(None) => {
                    return Ok(not_found(ErrorCode::UserNotFound, "Destinatario no encontrado"));
                }
                Err(e) => return Ok(internal_error(format!("Error consultando usuarios: {e}"))),
            }
            vec![NewMessage {
                sender_id: ctx.user_id(),
                recipient_id: receptor_id,
                student_id: None,
                course: None,
                subject,
                content,
            }]
        }
        (None, Some(key)) => {
            let student = match lookup_students(&storage, [&key]).await {
                Ok(students) => match students.into_iter().find(|s| key.matches(s)) {
                    Some(student) => student,
                    None => {
                        return Ok(not_found(ErrorCode::StudentNotFound, "Alumno no encontrado."));
                    }
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
            let recipients = match recipients_for_students(&storage, std::slice::from_ref(&student)).await {
                Ok(mut recipients) => recipients.remove(&student.id).unwrap_or_default(),
                Err(e) => return Ok(internal_error(format!("Error resolviendo destinatarios: {e}"))),
            };
            if recipients.is_empty() {
                return Ok(bad_request(
                    ErrorCode::MessageInvalid,
                    "El alumno no tiene cuentas vinculadas",
                ));
            }
            recipients
                .into_iter()
                .map(|recipient_id| NewMessage {
                    sender_id: ctx.user_id(),
                    recipient_id,
                    student_id: Some(student.id),
                    course: Some(student.course.clone()),
                    subject: subject.clone(),
                    content: content.clone(),
                })
                .collect()
        }
        (None, None) => {
            return Ok(bad_request(
                ErrorCode::MessageInvalid,
                "Falta receptor_id o alumno",
            ));
        }
    };

    let messages = match storage.create_messages(new_messages).await {
        Ok(messages) => messages,
        Err(e) => return Ok(internal_error(format!("Error enviando el mensaje: {e}"))),
    };
    let report = notify_messages(&storage, &messages, &ctx.user).await;
    info!("User {} sent {} messages", ctx.user_id(), messages.len());

    Ok(HttpResponse::Created().json(ApiResponse::success(
        MessagesSentResponse {
            mensajes: messages,
            notificados: report.notified,
            notif_error: report.visible_error(&ctx),
        },
        "Mensaje enviado",
    )))
}
