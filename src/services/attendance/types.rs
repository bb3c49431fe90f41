use actix_web::{HttpResponse, Result as ActixResult};

use crate::models::ApiResponse;
use crate::models::attendance::entities::ATTENDANCE_TYPES;
use crate::models::attendance::responses::{AttendanceTypeOption, AttendanceTypesResponse};

pub async fn list_types() -> ActixResult<HttpResponse> {
    let tipos = ATTENDANCE_TYPES
        .iter()
        .map(|(id, nombre)| AttendanceTypeOption {
            id: (*id).to_string(),
            nombre: (*nombre).to_string(),
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AttendanceTypesResponse { tipos },
        "OK",
    )))
}
