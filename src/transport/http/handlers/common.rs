use crate::app::error::ServiceError;
use crate::transport::http::types::ErrorResponse;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: message.into(),
        }),
    )
        .into_response()
}

/// Malformed bodies are client errors like any other validation failure. Oversized bodies keep
/// their 413.
pub fn json_rejection(err: JsonRejection, expected: &str) -> Response {
    let status = match err.status() {
        StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::BAD_REQUEST,
    };
    error_response(
        status,
        format!("Invalid JSON body: {} (expected: {})", err.body_text(), expected),
    )
}

pub fn query_rejection(err: QueryRejection) -> Response {
    error_response(
        StatusCode::BAD_REQUEST,
        format!("Invalid query string: {}", err.body_text()),
    )
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::ImageUpload { .. } | ServiceError::Upstream(_) => {
                tracing::error!(error = %self, "Request failed upstream");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        error_response(status, self.to_string())
    }
}

/// Answers a bare `OPTIONS` request. CORS preflights are answered by the CORS layer before they
/// get here.
pub async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

/// Known path, unsupported method.
pub async fn method_not_allowed_handler() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

pub async fn fallback_handler(method: axum::http::Method) -> Response {
    if method == axum::http::Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    error_response(StatusCode::NOT_FOUND, "Not found")
}
