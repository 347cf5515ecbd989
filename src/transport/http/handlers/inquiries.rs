use crate::app::catalog_service::InquiryInput;
use crate::transport::http::handlers::common::json_rejection;
use crate::transport::http::types::{AppState, ErrorResponse, InquiryResponse, SubmitInquiryRequest};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[utoipa::path(
    post,
    path = "/api/inquiries",
    request_body = SubmitInquiryRequest,
    responses(
        (status = 200, description = "Inquiry stored", body = InquiryResponse),
        (status = 400, description = "Missing product id or invalid price", body = ErrorResponse),
        (status = 404, description = "No such product", body = ErrorResponse),
        (status = 500, description = "Record store failure", body = ErrorResponse)
    )
)]
pub async fn submit_inquiry_handler(
    State(state): State<AppState>,
    request: Result<Json<SubmitInquiryRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => {
            return json_rejection(
                e,
                "{\"productId\": string, \"price\": number, \"colors\"?: string, \"notes\"?: string}",
            );
        }
    };

    let input = InquiryInput {
        product_id: request.product_id,
        price: request.price,
        colors: request.colors,
        notes: request.notes,
    };
    match state.service.submit_inquiry(input).await {
        Ok(inquiry_id) => (
            StatusCode::OK,
            Json(InquiryResponse {
                success: true,
                message: "Inquiry submitted".to_string(),
                inquiry_id: Some(inquiry_id),
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
