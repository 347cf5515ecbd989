pub mod catalog_service;
pub mod error;
pub mod notifications;
