//! The catalog service: project creation, project lookup and inquiry submission.
//!
//! Each operation is a short sequence of awaited calls to the image host and the record store.
//! The service keeps no state between calls; every collaborator is injected at construction.

use crate::app::error::{ServiceError, ServiceResult};
use crate::app::notifications::{InquiryNotification, NotificationDispatcher};
use crate::domain::ids::{self, MAX_ID_ATTEMPTS};
use crate::domain::images::{self, ImageHost, ImageSource};
use crate::domain::model::{NewInquiry, NewProduct, NewProject, Price, Product, Project};
use crate::storage::{CatalogStore, PartialInsert};
use chrono::Utc;
use serde_json::Value as JsonValue;
use std::sync::Arc;

type IdSource = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedProject {
    pub project_id: String,
    pub product_count: usize,
    pub inquiry_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectWithProducts {
    pub project: Project,
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InquiryInput {
    pub product_id: Option<String>,
    pub price: Option<JsonValue>,
    pub colors: Option<String>,
    pub notes: Option<String>,
}

pub struct CatalogService {
    catalog: CatalogStore,
    images: Arc<dyn ImageHost>,
    notifications: NotificationDispatcher,
    frontend_url: String,
    next_project_id: IdSource,
}

impl CatalogService {
    pub fn new(
        catalog: CatalogStore,
        images: Arc<dyn ImageHost>,
        notifications: NotificationDispatcher,
        frontend_url: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            images,
            notifications,
            frontend_url: frontend_url.into().trim_end_matches('/').to_string(),
            next_project_id: Arc::new(ids::new_project_id),
        }
    }

    /// Replaces the random project-id source.
    pub fn with_id_source(mut self, source: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.next_project_id = Arc::new(source);
        self
    }

    pub fn store_backend(&self) -> &'static str {
        self.catalog.backend()
    }

    pub fn notifications_enabled(&self) -> bool {
        self.notifications.is_enabled()
    }

    pub fn inquiry_url(&self, project_id: &str) -> String {
        format!("{}/?project={}", self.frontend_url, project_id)
    }

    /// Creates a project and one product per image source.
    ///
    /// Inline images are uploaded before anything is written. If a product batch fails after the
    /// project row exists, already written products and the project are deleted again.
    pub async fn create_project(
        &self,
        project_name: Option<&str>,
        image_sources: Option<&JsonValue>,
    ) -> ServiceResult<CreatedProject> {
        let sources = parse_image_sources(image_sources)?;
        let inline_count = sources.iter().filter(|s| s.is_inline()).count();

        let image_urls = images::resolve_sources(self.images.as_ref(), sources)
            .await
            .map_err(|(index, e)| ServiceError::ImageUpload {
                index,
                message: e.to_string(),
            })?;

        let project_id = self.allocate_project_id().await?;
        let project = self
            .catalog
            .insert_project(&NewProject::new(project_id, project_name, Utc::now()))
            .await?;

        let products = NewProduct::batch(&project.id, &project.internal_ref, image_urls);
        match self.catalog.insert_products(&products).await {
            Ok(created) => {
                tracing::info!(
                    project_id = %project.id,
                    products = created.len(),
                    uploads = inline_count,
                    "Project created"
                );
                Ok(CreatedProject {
                    inquiry_url: self.inquiry_url(&project.id),
                    project_id: project.id,
                    product_count: created.len(),
                })
            }
            Err(PartialInsert { inserted_refs, source }) => {
                self.roll_back_project(&project, &inserted_refs).await;
                Err(source.into())
            }
        }
    }

    /// Looks a project up by its public id and lists its products in upload order.
    pub async fn get_project(&self, project_id: &str) -> ServiceResult<ProjectWithProducts> {
        let project_id = project_id.trim();
        if project_id.is_empty() {
            return Err(ServiceError::validation("Missing 'project' query parameter"));
        }

        let project = self
            .catalog
            .find_project(project_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound {
                entity: "Project",
                id: project_id.to_string(),
            })?;
        let products = self.catalog.products_for_project(&project).await?;
        tracing::debug!(project_id, products = products.len(), "Project fetched");

        Ok(ProjectWithProducts { project, products })
    }

    /// Validates and appends an inquiry, then queues a notification if one is configured.
    ///
    /// Returns the inquiry's store reference.
    pub async fn submit_inquiry(&self, input: InquiryInput) -> ServiceResult<String> {
        let product_id = input
            .product_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ServiceError::validation("Missing required field: productId"))?
            .to_string();
        let price = match input.price.as_ref() {
            None | Some(JsonValue::Null) => {
                return Err(ServiceError::validation("Missing required field: price"))
            }
            Some(v) => Price::parse(v).map_err(ServiceError::Validation)?,
        };

        let product = self
            .catalog
            .find_product(&product_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound {
                entity: "Product",
                id: product_id.clone(),
            })?;

        let inquiry = NewInquiry {
            product_id,
            price,
            colors: trimmed_or_empty(input.colors),
            notes: trimmed_or_empty(input.notes),
            submitted_at: Utc::now(),
            image_url: Some(product.image_url),
            project_refs: product.project_refs,
        };
        let inquiry_ref = self.catalog.insert_inquiry(&inquiry).await?;
        tracing::info!(
            product_id = %inquiry.product_id,
            inquiry = %inquiry_ref,
            "Inquiry stored"
        );

        self.notifications.dispatch(InquiryNotification {
            product_id: inquiry.product_id,
            price: inquiry.price.value(),
            colors: inquiry.colors,
            notes: inquiry.notes,
            image_url: inquiry.image_url,
        });

        Ok(inquiry_ref)
    }

    async fn allocate_project_id(&self) -> ServiceResult<String> {
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let candidate = (self.next_project_id)();
            if !self.catalog.project_id_taken(&candidate).await? {
                return Ok(candidate);
            }
            tracing::warn!(candidate = %candidate, attempt, "Project id already taken, drawing another");
        }
        Err(ServiceError::Upstream(format!(
            "could not allocate a free project id after {} attempts",
            MAX_ID_ATTEMPTS
        )))
    }

    /// Compensates a failed product write. Failures here are logged, never returned, so the
    /// caller still sees the error that caused the rollback.
    async fn roll_back_project(&self, project: &Project, product_refs: &[String]) {
        tracing::warn!(
            project_id = %project.id,
            written_products = product_refs.len(),
            "Product batch failed, rolling back project"
        );
        if let Err(e) = self.catalog.delete_products(product_refs).await {
            tracing::error!(project_id = %project.id, error = %e, "Failed to delete orphaned products");
        }
        if let Err(e) = self.catalog.delete_project(project).await {
            tracing::error!(project_id = %project.id, error = %e, "Failed to delete orphaned project");
        }
    }
}

/// Validates the raw `imageUrls` value: a non-empty array of non-blank strings, each a hosted URL
/// or an inline data URL.
pub fn parse_image_sources(value: Option<&JsonValue>) -> ServiceResult<Vec<ImageSource>> {
    let items = match value {
        None | Some(JsonValue::Null) => {
            return Err(ServiceError::validation("Missing required field: imageUrls"))
        }
        Some(JsonValue::Array(items)) => items,
        Some(_) => return Err(ServiceError::validation("imageUrls must be an array")),
    };
    if items.is_empty() {
        return Err(ServiceError::validation("imageUrls must contain at least one image"));
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let raw = item
                .as_str()
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| {
                    ServiceError::Validation(format!("imageUrls[{}] must be a non-empty string", index))
                })?;
            ImageSource::parse(raw)
                .map_err(|e| ServiceError::Validation(format!("imageUrls[{}]: {}", index, e)))
        })
        .collect()
}

fn trimmed_or_empty(value: Option<String>) -> String {
    value.map(|s| s.trim().to_string()).unwrap_or_default()
}
