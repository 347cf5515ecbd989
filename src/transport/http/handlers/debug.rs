use crate::transport::http::types::{ApiResponse, AppState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

/// Reports which integrations are configured. Only routed when `ENABLE_DEBUG_ENDPOINT=true`.
#[utoipa::path(
    get,
    path = "/api/debug",
    responses(
        (status = 200, description = "Configuration summary (no secrets)", body = ApiResponse)
    )
)]
pub async fn debug_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut data = serde_json::to_value(state.diagnostics.as_ref()).unwrap_or_default();
    if let Some(obj) = data.as_object_mut() {
        obj.insert(
            "notificationsEnabled".to_string(),
            serde_json::Value::from(state.service.notifications_enabled()),
        );
    }
    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }),
    )
}
