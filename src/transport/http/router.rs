use crate::transport::http::handlers::common::{
    fallback_handler, method_not_allowed_handler, preflight_handler,
};
use crate::transport::http::handlers::{debug, health, inquiries, products};
use crate::transport::http::types::{
    ApiResponse, AppState, CreateProjectRequest, CreateProjectResponse, Diagnostics,
    ErrorResponse, InquiryResponse, ProductView, ProjectResponse, ProjectView, RouterOptions,
    SubmitInquiryRequest,
};
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        products::create_project_handler,
        products::get_project_handler,
        inquiries::submit_inquiry_handler,
        debug::debug_handler
    ),
    components(schemas(
        ApiResponse,
        ErrorResponse,
        CreateProjectRequest,
        CreateProjectResponse,
        ProjectResponse,
        ProjectView,
        ProductView,
        SubmitInquiryRequest,
        InquiryResponse,
        Diagnostics
    ))
)]
pub struct ApiDoc;

/// Cross-origin policy: an explicit origin allow-list and the three methods the API serves.
///
/// Origins that fail to parse as header values are skipped with a warning.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::OPTIONS, Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn create_router(app_state: AppState, options: &RouterOptions) -> Router {
    let mut router = Router::new()
        .route(
            "/health",
            get(health::healthcheck_handler)
                .options(preflight_handler)
                .fallback(method_not_allowed_handler),
        )
        .route(
            "/api/products",
            get(products::get_project_handler)
                .post(products::create_project_handler)
                .options(preflight_handler)
                .fallback(method_not_allowed_handler)
                .layer(DefaultBodyLimit::max(options.max_body_bytes)),
        )
        .route(
            "/api/inquiries",
            post(inquiries::submit_inquiry_handler)
                .options(preflight_handler)
                .fallback(method_not_allowed_handler),
        );

    if options.enable_debug_endpoint {
        router = router.route(
            "/api/debug",
            get(debug::debug_handler)
                .options(preflight_handler)
                .fallback(method_not_allowed_handler),
        );
    }

    router
        .fallback(fallback_handler)
        .with_state(app_state)
        .layer(cors_layer(&options.allowed_origins))
        .layer(TraceLayer::new_for_http())
}
