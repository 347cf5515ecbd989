//! The tabular record store seam.
//!
//! Everything durable lives in an external store that speaks in tables of loosely typed rows.
//! [`RecordStore`] is the minimal surface the catalog needs: create, filtered select, delete.

use crate::domain::model::{Fields, StoredRecord};
use async_trait::async_trait;
use serde_json::Value as JsonValue;

/// Upper bound on rows per create/delete request.
pub const MAX_BATCH: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record store unreachable: {0}")]
    Http(#[from] reqwest::Error),

    #[error("record store returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected record store payload: {0}")]
    Decode(String),

    #[error("batch of {rows} rows exceeds the per-request limit of {limit}")]
    BatchTooLarge { rows: usize, limit: usize },
}

/// A typed row filter. Field names are compile-time constants; values come from clients and are
/// escaped before they reach any query language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Text field equals the value exactly.
    Equals { field: &'static str, value: String },
    /// Text field starts with the prefix.
    StartsWith { field: &'static str, prefix: String },
}

impl Filter {
    pub fn equals(field: &'static str, value: impl Into<String>) -> Self {
        Filter::Equals { field, value: value.into() }
    }

    pub fn starts_with(field: &'static str, prefix: impl Into<String>) -> Self {
        Filter::StartsWith { field, prefix: prefix.into() }
    }

    /// Renders the filter as a store formula.
    pub fn to_formula(&self) -> String {
        match self {
            Filter::Equals { field, value } => {
                format!("{{{}}} = '{}'", field, escape_formula_string(value))
            }
            Filter::StartsWith { field, prefix } => format!(
                "LEFT({{{}}}, {}) = '{}'",
                field,
                prefix.chars().count(),
                escape_formula_string(prefix)
            ),
        }
    }

    /// Evaluates the filter against a row held in memory.
    pub fn matches(&self, fields: &Fields) -> bool {
        let text = |field: &str| fields.get(field).and_then(JsonValue::as_str);
        match self {
            Filter::Equals { field, value } => text(field) == Some(value.as_str()),
            Filter::StartsWith { field, prefix } => {
                text(field).is_some_and(|s| s.starts_with(prefix.as_str()))
            }
        }
    }
}

/// Escapes a value for use inside a single-quoted formula string literal.
fn escape_formula_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short name of the backend, for diagnostics.
    fn backend(&self) -> &'static str;

    /// Creates up to [`MAX_BATCH`] rows and returns them with their internal references,
    /// in the order given.
    async fn create(&self, table: &str, rows: Vec<Fields>) -> Result<Vec<StoredRecord>, StoreError>;

    /// Returns every row of `table` matching `filter`.
    async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<StoredRecord>, StoreError>;

    /// Deletes rows by internal reference.
    async fn delete(&self, table: &str, refs: &[String]) -> Result<(), StoreError>;
}
