//! Domain model definitions for the three persisted entities.

use serde::Deserialize;
use serde_json::Value as JsonValue;

pub mod inquiry;
pub mod product;
pub mod project;

pub use inquiry::{NewInquiry, Price, INQUIRY_STATUS_SUBMITTED};
pub use product::{sort_by_ordinal, NewProduct, Product};
pub use project::{default_project_name, NewProject, Project, ProjectStatus};

/// Column values of one row, keyed by field name.
pub type Fields = serde_json::Map<String, JsonValue>;

/// A row as returned by the record store.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoredRecord {
    /// The store's own opaque handle for the row (the "internal reference").
    pub id: String,
    #[serde(default)]
    pub fields: Fields,
    #[serde(default, rename = "createdTime")]
    pub created_time: Option<String>,
}

/// Contract for an entity that is read back from a store table.
///
/// Each model maps its own field names; the store adapter only deals in [`Fields`].
pub trait TableModel: Sized {
    /// Name of the store table holding this entity.
    const TABLE: &'static str;

    /// Builds the entity from a stored row.
    /// Returns Err(String) describing the first missing or malformed field.
    fn from_record(record: &StoredRecord) -> Result<Self, String>;
}

/// Contract for an entity that is written to a store table.
pub trait NewRow {
    const TABLE: &'static str;

    fn to_fields(&self) -> Fields;
}

pub(crate) fn required_str<'a>(fields: &'a Fields, name: &str) -> Result<&'a str, String> {
    fields
        .get(name)
        .and_then(JsonValue::as_str)
        .ok_or_else(|| format!("field '{}' is missing or not text", name))
}

pub(crate) fn optional_str(fields: &Fields, name: &str) -> Option<String> {
    fields.get(name).and_then(JsonValue::as_str).map(str::to_string)
}

/// Reads a link field: a list of internal references.
pub(crate) fn link_refs(fields: &Fields, name: &str) -> Vec<String> {
    match fields.get(name) {
        Some(JsonValue::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Some(JsonValue::String(single)) => vec![single.clone()],
        _ => Vec::new(),
    }
}
