//! Builds the outbound clients described by [`AppConfig`].

use std::sync::Arc;

use anyhow::Context;
use tokio::task::JoinHandle;

use crate::app::catalog_service::CatalogService;
use crate::app::notifications::NotificationDispatcher;
use crate::domain::images::{ImageHost, UnconfiguredImageHost};
use crate::infra::config::{AppConfig, StoreConfig};
use crate::infra::email::ResendNotifier;
use crate::infra::imgbb::ImgbbClient;
use crate::storage::{AirtableStore, CatalogStore, InMemoryStore, RecordStore};

pub fn record_store(config: &AppConfig) -> anyhow::Result<Arc<dyn RecordStore>> {
    let store: Arc<dyn RecordStore> = match &config.store {
        StoreConfig::Airtable { api_url, base_id, api_key } => Arc::new(
            AirtableStore::new(
                api_url.as_str(),
                base_id.as_str(),
                api_key.as_str(),
                config.upstream_timeout,
            )
            .context("failed to build record store client")?,
        ),
        StoreConfig::Memory => {
            tracing::warn!("Using the in-memory record store; data is lost on restart");
            Arc::new(InMemoryStore::new())
        }
    };
    Ok(store)
}

pub fn image_host(config: &AppConfig) -> anyhow::Result<Arc<dyn ImageHost>> {
    let host: Arc<dyn ImageHost> = match &config.imgbb_api_key {
        Some(key) => Arc::new(
            ImgbbClient::new(key.as_str(), config.upstream_timeout)
                .context("failed to build image host client")?,
        ),
        None => {
            tracing::info!("IMGBB_API_KEY not set; inline image uploads are disabled");
            Arc::new(UnconfiguredImageHost)
        }
    };
    Ok(host)
}

/// Starts the notification task when email is configured.
///
/// Must be called from within a Tokio runtime.
pub fn notifications(
    config: &AppConfig,
) -> anyhow::Result<(NotificationDispatcher, Option<JoinHandle<()>>)> {
    match &config.email {
        Some(email) => {
            let notifier = ResendNotifier::new(email, config.upstream_timeout)?;
            let (dispatcher, handle) = NotificationDispatcher::start(Arc::new(notifier));
            Ok((dispatcher, Some(handle)))
        }
        None => {
            tracing::info!("Email notifications disabled (RESEND_API_KEY not set)");
            Ok((NotificationDispatcher::disabled(), None))
        }
    }
}

/// Wires the catalog service from configuration.
pub fn catalog_service(
    config: &AppConfig,
) -> anyhow::Result<(CatalogService, Option<JoinHandle<()>>)> {
    let store = record_store(config)?;
    let images = image_host(config)?;
    let (dispatcher, handle) = notifications(config)?;
    let service = CatalogService::new(
        CatalogStore::new(store),
        images,
        dispatcher,
        config.frontend_url.as_str(),
    );
    Ok((service, handle))
}
