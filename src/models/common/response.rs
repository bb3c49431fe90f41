use serde::Serialize;

use crate::models::ErrorCode;

/// Response envelope.
///
/// `ok`/`success` mirror each other for older clients; payload fields are
/// flattened next to them so `{ok, success, curso, guardadas, ...}` stays a
/// single flat object.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub success: bool,
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(flatten)]
    pub data: Option<T>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            success: true,
            code: ErrorCode::Success as i32,
            message: message.into(),
            detail: None,
            data: Some(data),
            timestamp: chrono::Utc::now(),
        }
    }

    /// Failure that still reports counters (`guardadas`, `errores`, ...).
    pub fn error(code: ErrorCode, data: T, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self {
            ok: false,
            success: false,
            code: code as i32,
            message: detail.clone(),
            detail: Some(detail),
            data: Some(data),
            timestamp: chrono::Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            success: true,
            code: ErrorCode::Success as i32,
            message: message.into(),
            detail: None,
            data: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error_empty(code: ErrorCode, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self {
            ok: false,
            success: false,
            code: code as i32,
            message: detail.clone(),
            detail: Some(detail),
            data: None,
            timestamp: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Counters {
        guardadas: usize,
        errores: usize,
    }

    #[test]
    fn test_success_flattens_payload() {
        let response = ApiResponse::success(
            Counters {
                guardadas: 2,
                errores: 0,
            },
            "ok",
        );
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(value["success"], true);
        assert_eq!(value["guardadas"], 2);
        assert_eq!(value["errores"], 0);
        assert!(value.get("detail").is_none());
        assert!(value.get("data").is_none());
    }

    #[test]
    fn test_error_empty_carries_detail() {
        let response = ApiResponse::error_empty(ErrorCode::BadRequest, "Falta curso");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["ok"], false);
        assert_eq!(value["detail"], "Falta curso");
        assert_eq!(value["code"], ErrorCode::BadRequest as i32);
    }
}
