pub mod catalog;
pub mod tables;

pub use catalog::{CatalogStore, PartialInsert};
pub use tables::{AirtableStore, InMemoryStore, RecordStore, StoreError};
