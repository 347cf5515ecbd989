pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::catalog_service::CatalogService;
pub use app::error::ServiceError;
pub use app::notifications::{InquiryNotification, NotificationDispatcher, Notifier};
pub use domain::images::{ImageHost, ImageSource};
pub use infra::config::AppConfig;
pub use storage::{CatalogStore, InMemoryStore, RecordStore};
