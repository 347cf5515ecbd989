//! Record store backed by the Airtable REST API.

use super::store::{Filter, RecordStore, StoreError, MAX_BATCH};
use crate::domain::model::{Fields, StoredRecord};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;

pub const AIRTABLE_API_URL: &str = "https://api.airtable.com/v0";

/// Page size requested from list endpoints (the API maximum).
const PAGE_SIZE: &str = "100";

#[derive(Clone)]
pub struct AirtableStore {
    http_client: HttpClient,
    api_url: String,
    base_id: String,
    api_key: String,
}

impl std::fmt::Debug for AirtableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirtableStore")
            .field("api_url", &self.api_url)
            .field("base_id", &self.base_id)
            .finish()
    }
}

#[derive(Serialize)]
struct CreateBody<'a> {
    records: Vec<NewRecord<'a>>,
    typecast: bool,
}

#[derive(Serialize)]
struct NewRecord<'a> {
    fields: &'a Fields,
}

#[derive(Deserialize)]
struct RecordsPage {
    #[serde(default)]
    records: Vec<StoredRecord>,
    #[serde(default)]
    offset: Option<String>,
}

impl AirtableStore {
    pub fn new(
        api_url: impl Into<String>,
        base_id: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            base_id: base_id.into(),
            api_key: api_key.into(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}/{}", self.api_url, self.base_id, table)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Api {
            status: status.as_u16(),
            message: api_error_message(&body),
        })
    }
}

/// Pulls a readable message out of an error body.
///
/// The API reports errors either as `{"error": "CODE"}` or
/// `{"error": {"type": "...", "message": "..."}}`.
fn api_error_message(body: &str) -> String {
    let parsed: Option<JsonValue> = serde_json::from_str(body).ok();
    match parsed.as_ref().and_then(|v| v.get("error")) {
        Some(JsonValue::String(code)) => code.clone(),
        Some(JsonValue::Object(err)) => {
            let kind = err.get("type").and_then(JsonValue::as_str).unwrap_or("ERROR");
            match err.get("message").and_then(JsonValue::as_str) {
                Some(msg) => format!("{}: {}", kind, msg),
                None => kind.to_string(),
            }
        }
        _ if body.trim().is_empty() => "empty response body".to_string(),
        _ => body.chars().take(200).collect(),
    }
}

#[async_trait]
impl RecordStore for AirtableStore {
    fn backend(&self) -> &'static str {
        "airtable"
    }

    async fn create(&self, table: &str, rows: Vec<Fields>) -> Result<Vec<StoredRecord>, StoreError> {
        if rows.len() > MAX_BATCH {
            return Err(StoreError::BatchTooLarge { rows: rows.len(), limit: MAX_BATCH });
        }
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let body = CreateBody {
            records: rows.iter().map(|fields| NewRecord { fields }).collect(),
            typecast: true,
        };
        let response = self
            .http_client
            .post(self.table_url(table))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let page: RecordsPage = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        if page.records.len() != rows.len() {
            return Err(StoreError::Decode(format!(
                "created {} rows in '{}' but {} were returned",
                rows.len(),
                table,
                page.records.len()
            )));
        }
        Ok(page.records)
    }

    async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<StoredRecord>, StoreError> {
        let formula = filter.to_formula();
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut query: Vec<(&str, &str)> =
                vec![("filterByFormula", formula.as_str()), ("pageSize", PAGE_SIZE)];
            if let Some(o) = offset.as_deref() {
                query.push(("offset", o));
            }
            let response = self
                .http_client
                .get(self.table_url(table))
                .bearer_auth(&self.api_key)
                .query(&query)
                .send()
                .await?;
            let page: RecordsPage = Self::check(response)
                .await?
                .json()
                .await
                .map_err(|e| StoreError::Decode(e.to_string()))?;

            records.extend(page.records);
            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        tracing::debug!(table, formula = %formula, rows = records.len(), "Selected rows");
        Ok(records)
    }

    async fn delete(&self, table: &str, refs: &[String]) -> Result<(), StoreError> {
        for chunk in refs.chunks(MAX_BATCH) {
            let query: Vec<(&str, &str)> = chunk.iter().map(|r| ("records[]", r.as_str())).collect();
            let response = self
                .http_client
                .delete(self.table_url(table))
                .bearer_auth(&self.api_key)
                .query(&query)
                .send()
                .await?;
            Self::check(response).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_bodies_are_summarised() {
        assert_eq!(api_error_message(r#"{"error":"NOT_FOUND"}"#), "NOT_FOUND");
        assert_eq!(
            api_error_message(
                r#"{"error":{"type":"INVALID_MULTIPLE_CHOICE_OPTIONS","message":"Insufficient permissions to create new select option"}}"#
            ),
            "INVALID_MULTIPLE_CHOICE_OPTIONS: Insufficient permissions to create new select option"
        );
        assert_eq!(api_error_message(""), "empty response body");
        assert_eq!(api_error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn debug_output_hides_the_api_key() {
        let store = AirtableStore::new(
            "https://api.airtable.com/v0/",
            "appBASE",
            "patSECRET",
            Duration::from_secs(5),
        )
        .unwrap();
        let rendered = format!("{:?}", store);
        assert!(rendered.contains("appBASE"));
        assert!(!rendered.contains("patSECRET"));
        assert_eq!(store.table_url("projects"), "https://api.airtable.com/v0/appBASE/projects");
    }

    #[test]
    fn list_pages_decode_with_and_without_offset() {
        let page: RecordsPage = serde_json::from_str(
            r#"{"records":[{"id":"rec1","createdTime":"2024-01-01T00:00:00.000Z","fields":{"id":"proj_123456"}}],"offset":"itr1/rec1"}"#,
        )
        .unwrap();
        assert_eq!(page.records[0].id, "rec1");
        assert_eq!(page.offset.as_deref(), Some("itr1/rec1"));

        let page: RecordsPage = serde_json::from_str(r#"{"records":[]}"#).unwrap();
        assert!(page.records.is_empty());
        assert!(page.offset.is_none());
    }
}
