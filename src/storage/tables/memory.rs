//! Process-local record store for development runs and tests.
//!
//! Behaves like the hosted store where the catalog can observe it: generated `rec…` references,
//! `createdTime` stamps, insertion-ordered selects and the per-request batch limit.

use super::store::{Filter, RecordStore, StoreError, MAX_BATCH};
use crate::domain::model::{Fields, StoredRecord};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<HashMap<String, Vec<StoredRecord>>>,
    next_ref: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All rows of `table`, in insertion order.
    pub fn rows(&self, table: &str) -> Vec<StoredRecord> {
        self.lock().get(table).cloned().unwrap_or_default()
    }

    /// Inserts a row directly, bypassing the batch limit. Used to seed fixtures.
    pub fn seed(&self, table: &str, fields: Fields) -> StoredRecord {
        let record = self.new_record(fields);
        self.lock()
            .entry(table.to_string())
            .or_default()
            .push(record.clone());
        record
    }

    fn new_record(&self, fields: Fields) -> StoredRecord {
        let n = self.next_ref.fetch_add(1, Ordering::Relaxed) + 1;
        StoredRecord {
            id: format!("rec{:014}", n),
            fields,
            created_time: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<StoredRecord>>> {
        // A panic while holding the lock leaves the map itself intact.
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, table: &str, rows: Vec<Fields>) -> Result<Vec<StoredRecord>, StoreError> {
        if rows.len() > MAX_BATCH {
            return Err(StoreError::BatchTooLarge { rows: rows.len(), limit: MAX_BATCH });
        }
        let created: Vec<StoredRecord> = rows.into_iter().map(|f| self.new_record(f)).collect();
        self.lock()
            .entry(table.to_string())
            .or_default()
            .extend(created.iter().cloned());
        Ok(created)
    }

    async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<StoredRecord>, StoreError> {
        Ok(self
            .lock()
            .get(table)
            .map(|rows| rows.iter().filter(|r| filter.matches(&r.fields)).cloned().collect())
            .unwrap_or_default())
    }

    async fn delete(&self, table: &str, refs: &[String]) -> Result<(), StoreError> {
        if let Some(rows) = self.lock().get_mut(table) {
            rows.retain(|r| !refs.contains(&r.id));
        }
        Ok(())
    }
}
