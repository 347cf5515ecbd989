pub mod airtable;
pub mod memory;
pub mod store;

pub use airtable::AirtableStore;
pub use memory::InMemoryStore;
pub use store::{Filter, RecordStore, StoreError, MAX_BATCH};
