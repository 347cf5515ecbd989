// src/bin/api_server.rs

use product_inquiry::infra::{clients, telemetry};
use product_inquiry::transport;
use product_inquiry::AppConfig;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let config = AppConfig::from_env()?;
    tracing::info!(
        store = config.store.kind(),
        image_host = config.imgbb_api_key.is_some(),
        email = config.email.is_some(),
        origins = ?config.allowed_origins,
        "Configuration loaded"
    );

    // --- Service Initialization ---
    let (service, notification_task) = clients::catalog_service(&config)?;
    let app_state = transport::http::AppState::new(
        service,
        transport::http::Diagnostics::from_config(&config),
    );

    // --- API Server Initialization ---
    let options = transport::http::RouterOptions::from(&config);
    if options.enable_debug_endpoint {
        tracing::warn!("Debug endpoint enabled at /api/debug");
    }
    let app = transport::http::create_router(app_state, &options).merge(
        SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()),
    );

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("API server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutdown signal received");
        })
        .await?;

    // The router (and with it the last dispatcher handle) is gone; let queued emails drain.
    if let Some(task) = notification_task {
        if let Err(e) = task.await {
            tracing::warn!(error = %e, "Notification task ended abnormally");
        }
    }
    tracing::info!("Graceful shutdown complete");
    Ok(())
}
