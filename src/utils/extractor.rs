//! Path extractors that reject malformed ids with the JSON envelope instead
//! of actix's plain-text 404.

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

/// Defines a tuple struct wrapping a positive `i64` read from the named path
/// segment.
macro_rules! define_safe_i64_extractor {
    ($name:ident, $segment:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(pub i64);

        impl FromRequest for $name {
            type Error = actix_web::Error;
            type Future = Ready<Result<Self, Self::Error>>;

            fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
                ready(parse_positive_id(req, $segment).map($name))
            }
        }
    };
}

fn parse_positive_id(req: &HttpRequest, segment: &str) -> Result<i64, actix_web::Error> {
    let raw = req.match_info().get(segment).unwrap_or_default();
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => {
            let response = HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                format!("Invalid {segment}: {raw}"),
            ));
            Err(InternalError::from_response("invalid path id", response).into())
        }
    }
}

define_safe_i64_extractor!(SafeIDI64, "id");
define_safe_i64_extractor!(SafeStudentIdI64, "student_id");
define_safe_i64_extractor!(SafeNotificationIdI64, "notification_id");

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_valid_id_is_extracted() {
        let req = TestRequest::default().param("id", "17").to_http_request();
        let id = SafeIDI64::extract(&req).await.unwrap();
        assert_eq!(id, SafeIDI64(17));
    }

    #[actix_web::test]
    async fn test_non_numeric_and_negative_ids_are_rejected() {
        let req = TestRequest::default().param("id", "abc").to_http_request();
        assert!(SafeIDI64::extract(&req).await.is_err());

        let req = TestRequest::default().param("id", "-3").to_http_request();
        assert!(SafeIDI64::extract(&req).await.is_err());

        let req = TestRequest::default()
            .param("student_id", "0")
            .to_http_request();
        assert!(SafeStudentIdI64::extract(&req).await.is_err());
    }
}
