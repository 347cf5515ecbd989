use crate::app::catalog_service::{CatalogService, CreatedProject, ProjectWithProducts};
use crate::domain::model::{Product, Project};
use crate::domain::model::{inquiry::INQUIRIES_TABLE, product::PRODUCTS_TABLE, project::PROJECTS_TABLE};
use crate::infra::config::{AppConfig, DEFAULT_MAX_BODY_BYTES};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CatalogService>,
    pub diagnostics: Arc<Diagnostics>,
}

impl AppState {
    pub fn new(service: CatalogService, diagnostics: Diagnostics) -> Self {
        Self {
            service: Arc::new(service),
            diagnostics: Arc::new(diagnostics),
        }
    }
}

/// Router-level options that are not part of request handling.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub allowed_origins: Vec<String>,
    pub enable_debug_endpoint: bool,
    /// Body limit for project creation; other routes keep the framework default.
    pub max_body_bytes: usize,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            enable_debug_endpoint: false,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl From<&AppConfig> for RouterOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            allowed_origins: config.allowed_origins.clone(),
            enable_debug_endpoint: config.enable_debug_endpoint,
            max_body_bytes: config.max_body_bytes,
        }
    }
}

/// What the debug endpoint reports. Never holds secrets, only whether they are set.
#[derive(Serialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub store_backend: String,
    pub image_host_configured: bool,
    pub email_configured: bool,
    pub tables: Vec<String>,
    pub allowed_origins: Vec<String>,
    pub frontend_url: String,
}

impl Diagnostics {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            store_backend: config.store.kind().to_string(),
            image_host_configured: config.imgbb_api_key.is_some(),
            email_configured: config.email.is_some(),
            tables: [PROJECTS_TABLE, PRODUCTS_TABLE, INQUIRIES_TABLE]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            allowed_origins: config.allowed_origins.clone(),
            frontend_url: config.frontend_url.clone(),
        }
    }
}

/// Generic envelope used by the health and debug endpoints.
#[derive(Serialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    /// Optional display name; blank names become `Project YYYY-MM-DD`.
    #[serde(default)]
    pub project_name: Option<String>,
    /// Hosted `http(s)` URLs and/or `data:image/...;base64,...` payloads, in display order.
    ///
    /// Kept untyped so a wrong shape is reported as a validation error rather than a parse error.
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub image_urls: Option<JsonValue>,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectResponse {
    pub success: bool,
    pub project_id: String,
    pub product_count: usize,
    pub inquiry_url: String,
    pub message: String,
}

impl From<CreatedProject> for CreateProjectResponse {
    fn from(created: CreatedProject) -> Self {
        Self {
            success: true,
            message: format!(
                "Created project {} with {} products",
                created.project_id, created.product_count
            ),
            project_id: created.project_id,
            product_count: created.product_count,
            inquiry_url: created.inquiry_url,
        }
    }
}

#[derive(Deserialize, Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProjectQuery {
    /// Public project id, e.g. `proj_123456`.
    pub project: Option<String>,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub id: String,
    pub name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Project> for ProjectView {
    fn from(p: Project) -> Self {
        Self {
            status: p.status.to_string(),
            id: p.id,
            name: p.name,
            created_at: p.created_at,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: String,
    pub image_url: String,
}

impl From<Product> for ProductView {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            image_url: p.image_url,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ProjectResponse {
    pub success: bool,
    pub project: ProjectView,
    pub products: Vec<ProductView>,
}

impl From<ProjectWithProducts> for ProjectResponse {
    fn from(found: ProjectWithProducts) -> Self {
        Self {
            success: true,
            project: found.project.into(),
            products: found.products.into_iter().map(ProductView::from).collect(),
        }
    }
}

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitInquiryRequest {
    #[serde(default)]
    pub product_id: Option<String>,
    /// Positive number, or a string holding one.
    #[serde(default)]
    #[schema(value_type = f64)]
    pub price: Option<JsonValue>,
    #[serde(default)]
    pub colors: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InquiryResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inquiry_id: Option<String>,
}
