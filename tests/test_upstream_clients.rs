//! The Airtable and ImgBB clients against local stand-ins for both APIs.
//!
//! A small axum app plays both services on an ephemeral port and records what it receives.

use axum::extract::{Path, Query, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Form, Json, Router};
use product_inquiry::domain::images::{ImageHost, InlineImage};
use product_inquiry::domain::model::Fields;
use product_inquiry::infra::imgbb::ImgbbClient;
use product_inquiry::storage::tables::Filter;
use product_inquiry::storage::{AirtableStore, StoreError};
use product_inquiry::RecordStore;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const BASE_ID: &str = "appTEST";
const API_KEY: &str = "patTEST";
const IMGBB_KEY: &str = "imgbb-good";

#[derive(Default)]
struct Seen {
    authorization: Vec<String>,
    create_bodies: Vec<Value>,
    list_queries: Vec<HashMap<String, String>>,
    delete_queries: Vec<String>,
    uploads: Vec<HashMap<String, String>>,
}

type Shared = Arc<Mutex<Seen>>;

fn bearer(headers: &HeaderMap) -> String {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn create_rows(
    State(seen): State<Shared>,
    Path((base, table)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    {
        let mut seen = seen.lock().unwrap();
        seen.authorization.push(bearer(&headers));
        seen.create_bodies.push(body.clone());
    }
    if base != BASE_ID {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "NOT_FOUND"})));
    }
    match table.as_str() {
        "broken" => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"error": {
                "type": "INVALID_VALUE_FOR_COLUMN",
                "message": "Field \"price\" cannot accept the provided value"
            }})),
        ),
        "short" => (StatusCode::OK, Json(json!({"records": []}))),
        _ => {
            let records: Vec<Value> = body["records"]
                .as_array()
                .cloned()
                .unwrap_or_default()
                .iter()
                .enumerate()
                .map(|(i, r)| {
                    json!({
                        "id": format!("rec{}{}", table, i),
                        "createdTime": "2026-10-17T09:30:00.000Z",
                        "fields": r["fields"],
                    })
                })
                .collect();
            (StatusCode::OK, Json(json!({ "records": records })))
        }
    }
}

/// Two pages: the first carries an offset pointing at the second.
async fn list_rows(
    State(seen): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let page = match query.get("offset").map(String::as_str) {
        None => json!({
            "records": [{"id": "recP1", "createdTime": "2026-10-17T09:30:00.000Z", "fields": {"id": "proj_123456_item1"}}],
            "offset": "itrPAGE2/recP1"
        }),
        Some(_) => json!({
            "records": [{"id": "recP2", "createdTime": "2026-10-17T09:30:00.000Z", "fields": {"id": "proj_123456_item2"}}]
        }),
    };
    seen.lock().unwrap().list_queries.push(query);
    Json(page)
}

async fn delete_rows(State(seen): State<Shared>, RawQuery(query): RawQuery) -> Json<Value> {
    let query = query.unwrap_or_default();
    seen.lock().unwrap().delete_queries.push(query);
    Json(json!({"records": []}))
}

async fn upload_image(
    State(seen): State<Shared>,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let key_ok = form.get("key").map(String::as_str) == Some(IMGBB_KEY);
    seen.lock().unwrap().uploads.push(form);
    if key_ok {
        (
            StatusCode::OK,
            Json(json!({"data": {"url": "https://i.ibb.co/abc/photo.jpg"}, "success": true, "status": 200})),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"status_code": 400, "error": {"message": "Invalid API v1 key.", "code": 100}})),
        )
    }
}

/// Starts the stand-in APIs and returns their base URL.
async fn spawn_upstreams() -> (String, Shared) {
    let seen: Shared = Arc::default();
    let router = Router::new()
        .route(
            "/v0/:base/:table",
            post(create_rows).get(list_rows).delete(delete_rows),
        )
        .route("/1/upload", post(upload_image))
        .with_state(seen.clone());

    // Bind to an ephemeral port to avoid conflicts between tests.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://127.0.0.1:{}", port), seen)
}

fn airtable(base_url: &str) -> AirtableStore {
    AirtableStore::new(
        format!("{}/v0/", base_url),
        BASE_ID,
        API_KEY,
        Duration::from_secs(5),
    )
    .unwrap()
}

fn fields(v: Value) -> Fields {
    v.as_object().cloned().unwrap()
}

#[tokio::test]
async fn create_posts_typecast_records_with_bearer_auth() {
    let (base_url, seen) = spawn_upstreams().await;
    let store = airtable(&base_url);

    let created = store
        .create(
            "products",
            vec![
                fields(json!({"id": "proj_123456_item1", "imageUrl": "https://host/a.png"})),
                fields(json!({"id": "proj_123456_item2", "imageUrl": "https://host/b.png"})),
            ],
        )
        .await
        .unwrap();
    assert_eq!(created.len(), 2);
    assert_eq!(created[0].id, "recproducts0");
    assert_eq!(created[1].fields["id"], "proj_123456_item2");
    assert_eq!(created[0].created_time.as_deref(), Some("2026-10-17T09:30:00.000Z"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.authorization, vec![format!("Bearer {}", API_KEY)]);
    let body = &seen.create_bodies[0];
    assert_eq!(body["typecast"], true);
    assert_eq!(body["records"].as_array().unwrap().len(), 2);
    assert_eq!(body["records"][0]["fields"]["imageUrl"], "https://host/a.png");
}

#[tokio::test]
async fn create_rejects_a_short_reply() {
    let (base_url, _seen) = spawn_upstreams().await;
    let err = airtable(&base_url)
        .create("short", vec![fields(json!({"id": "a"})), fields(json!({"id": "b"}))])
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Decode(_)), "{err:?}");
}

#[tokio::test]
async fn create_refuses_oversized_batches_without_a_request() {
    let (base_url, seen) = spawn_upstreams().await;
    let rows = (0..11).map(|i| fields(json!({ "id": i.to_string() }))).collect();
    let err = airtable(&base_url).create("products", rows).await.unwrap_err();
    assert!(matches!(err, StoreError::BatchTooLarge { rows: 11, limit: 10 }));
    assert!(seen.lock().unwrap().create_bodies.is_empty());
}

#[tokio::test]
async fn error_replies_keep_status_and_message() {
    let (base_url, _seen) = spawn_upstreams().await;
    let err = airtable(&base_url)
        .create("broken", vec![fields(json!({"price": "lots"}))])
        .await
        .unwrap_err();
    match err {
        StoreError::Api { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(
                message,
                "INVALID_VALUE_FOR_COLUMN: Field \"price\" cannot accept the provided value"
            );
        }
        other => panic!("expected an API error, got {other:?}"),
    }
}

#[tokio::test]
async fn select_follows_offsets_across_pages() {
    let (base_url, seen) = spawn_upstreams().await;
    let rows = airtable(&base_url)
        .select("products", &Filter::starts_with("id", "proj_123456_item"))
        .await
        .unwrap();
    let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["recP1", "recP2"]);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.list_queries.len(), 2);
    let first = &seen.list_queries[0];
    assert_eq!(first["filterByFormula"], "LEFT({id}, 16) = 'proj_123456_item'");
    assert_eq!(first["pageSize"], "100");
    assert!(!first.contains_key("offset"));
    assert_eq!(seen.list_queries[1]["offset"], "itrPAGE2/recP1");
    assert_eq!(seen.list_queries[1]["filterByFormula"], first["filterByFormula"]);
}

#[tokio::test]
async fn select_escapes_client_values() {
    let (base_url, seen) = spawn_upstreams().await;
    airtable(&base_url)
        .select("products", &Filter::equals("id", "x' OR TRUE() OR '"))
        .await
        .unwrap();
    let seen = seen.lock().unwrap();
    assert_eq!(
        seen.list_queries[0]["filterByFormula"],
        "{id} = 'x\\' OR TRUE() OR \\''"
    );
}

#[tokio::test]
async fn delete_sends_at_most_ten_refs_per_request() {
    let (base_url, seen) = spawn_upstreams().await;
    let refs: Vec<String> = (1..=11).map(|i| format!("rec{:03}", i)).collect();
    airtable(&base_url).delete("products", &refs).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.delete_queries.len(), 2);
    let counts: Vec<usize> = seen
        .delete_queries
        .iter()
        .map(|q| q.split('&').filter(|pair| pair.starts_with("records")).count())
        .collect();
    assert_eq!(counts, vec![10, 1]);
    assert!(seen.delete_queries[0].contains("rec001"));
    assert!(seen.delete_queries[1].contains("rec011"));
}

#[tokio::test]
async fn imgbb_upload_posts_key_and_payload() {
    let (base_url, seen) = spawn_upstreams().await;
    let client = ImgbbClient::new(IMGBB_KEY, Duration::from_secs(5))
        .unwrap()
        .with_upload_url(format!("{}/1/upload", base_url));
    let image = InlineImage {
        mime_type: "image/png".into(),
        base64: "iVBORw0KGgo=".into(),
    };

    let url = client.upload(&image).await.unwrap();
    assert_eq!(url, "https://i.ibb.co/abc/photo.jpg");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.uploads[0]["key"], IMGBB_KEY);
    assert_eq!(seen.uploads[0]["image"], "iVBORw0KGgo=");
}

#[tokio::test]
async fn imgbb_rejections_become_host_errors() {
    let (base_url, _seen) = spawn_upstreams().await;
    let client = ImgbbClient::new("imgbb-revoked", Duration::from_secs(5))
        .unwrap()
        .with_upload_url(format!("{}/1/upload", base_url));
    let image = InlineImage {
        mime_type: "image/png".into(),
        base64: "iVBORw0KGgo=".into(),
    };

    let err = client.upload(&image).await.unwrap_err();
    assert_eq!(err.to_string(), "image host error: Invalid API v1 key. (400)");
}
