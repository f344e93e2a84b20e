//! HTTP tests for the transfer endpoints.
//!
//! Each test spawns the router on an ephemeral port backed by its own
//! in-memory store and talks to it over real HTTP.

use std::sync::Arc;

use boatyard_api::{router, AppState, StoreBackend};
use boatyard_core::{Collection, MemoryStore, Record, RecordStore};
use serde_json::{json, Value};

const TEST_BODY_LIMIT: usize = 1024 * 1024;

/// Start a server and return its base URL (e.g., "http://127.0.0.1:PORT").
async fn spawn_test_server(store: Arc<MemoryStore>, body_limit: usize) -> String {
    let state = AppState::new(store, StoreBackend::Memory);
    let app = router(state, body_limit);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for (collection, value) in [
        (
            Collection::Users,
            json!({"id": "U1", "name": "Anna", "passwordHash": "$argon2id$x"}),
        ),
        (Collection::Clients, json!({"id": "C1", "name": "Acme Marine"})),
        (
            Collection::Projects,
            json!({"id": "P1", "clientId": "C1", "configuration": {"isFrozen": true}}),
        ),
    ] {
        store
            .save(collection, Record::from_value(value).unwrap())
            .await
            .unwrap();
    }
    store
}

fn c1_p1_bundle() -> Value {
    json!({
        "manifest": {"version": "1.0.0"},
        "clients": [{"id": "C1"}],
        "projects": [{"id": "P1", "clientId": "C1"}]
    })
}

#[tokio::test]
async fn test_health() {
    let base = spawn_test_server(Arc::new(MemoryStore::new()), TEST_BODY_LIMIT).await;

    let resp = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.headers().contains_key("x-request-id"));

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["schemaVersion"], "1.0.0");
    assert_eq!(body["store"], "memory");
}

#[tokio::test]
async fn test_export_returns_attachment() {
    let base = spawn_test_server(seeded_store().await, TEST_BODY_LIMIT).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/v1/transfer/export", base))
        .header("X-Operator", "anna")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let disposition = resp
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"boatyard-export-"));
    assert!(disposition.ends_with(".json\""));

    let bundle: Value = resp.json().await.unwrap();
    assert_eq!(bundle["manifest"]["version"], "1.0.0");
    assert_eq!(bundle["manifest"]["exportedBy"], "anna");
    assert_eq!(bundle["manifest"]["counts"]["clients"], 1);
    assert!(bundle["users"][0].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_export_with_options() {
    let base = spawn_test_server(seeded_store().await, TEST_BODY_LIMIT).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/v1/transfer/export", base))
        .json(&json!({"includeProjects": false, "includeUsers": false}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let bundle: Value = resp.json().await.unwrap();
    assert!(bundle.get("projects").is_none());
    assert!(bundle.get("users").is_none());
    assert_eq!(bundle["manifest"]["exportedBy"], "system");

    let resp = client
        .post(format!("{}/api/v1/transfer/export", base))
        .json(&json!({"includeInvoices": true}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("includeInvoices"));
}

#[tokio::test]
async fn test_validate_always_answers_200() {
    let base = spawn_test_server(Arc::new(MemoryStore::new()), TEST_BODY_LIMIT).await;
    let client = reqwest::Client::new();
    let url = format!("{}/api/v1/transfer/validate", base);

    let ok: Value = client
        .post(&url)
        .json(&c1_p1_bundle())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ok, json!({"valid": true}));

    let resp = client.post(&url).json(&Value::Null).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["valid"], false);
    assert!(body["error"].as_str().unwrap().contains("null"));

    let body: Value = client
        .post(&url)
        .body("{ not json")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["valid"], false);
}

#[tokio::test]
async fn test_preview_reports_protected_conflicts() {
    let store = seeded_store().await;
    let base = spawn_test_server(store.clone(), TEST_BODY_LIMIT).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/v1/transfer/preview", base))
        .json(&c1_p1_bundle())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let preview: Value = resp.json().await.unwrap();
    assert_eq!(preview["isCompatible"], true);
    assert_eq!(
        preview["counts"]["projects"],
        json!({"new": 0, "existing": 1, "conflicts": 1})
    );

    let resp = client
        .post(format!("{}/api/v1/transfer/preview", base))
        .json(&json!({"clients": []}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("manifest"));
    assert_eq!(store.total().await, 3);
}

#[tokio::test]
async fn test_validated_bundle_with_odd_metadata_is_accepted() {
    let store = Arc::new(MemoryStore::new());
    let base = spawn_test_server(store.clone(), TEST_BODY_LIMIT).await;
    let client = reqwest::Client::new();
    let bundle = json!({
        "manifest": {"version": "1.0.0", "exportedBy": null, "exportedAt": "2024-05-01"},
        "clients": [{"id": "C1"}, "garbage", {"id": "C2"}]
    });

    let resp = client
        .post(format!("{}/api/v1/transfer/preview", base))
        .json(&bundle)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let preview: Value = resp.json().await.unwrap();
    assert_eq!(preview["counts"]["clients"]["new"], 2);

    let resp = client
        .post(format!("{}/api/v1/transfer/import", base))
        .json(&json!({"bundle": bundle}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let result: Value = resp.json().await.unwrap();
    assert_eq!(result["success"], false);
    assert_eq!(
        result["errors"],
        json!(["clients[1]: record must be an object, got a string"])
    );
    assert_eq!(result["imported"]["clients"], 2);
    assert_eq!(store.total().await, 2);
}

#[tokio::test]
async fn test_import_then_reimport() {
    let store = Arc::new(MemoryStore::new());
    let base = spawn_test_server(store.clone(), TEST_BODY_LIMIT).await;
    let client = reqwest::Client::new();
    let url = format!("{}/api/v1/transfer/import", base);

    let first: Value = client
        .post(&url)
        .json(&json!({"bundle": c1_p1_bundle()}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first["success"], true);
    assert_eq!(first["imported"], json!({"clients": 1, "projects": 1}));

    let second: Value = client
        .post(&url)
        .json(&json!({"bundle": c1_p1_bundle(), "options": {"mode": "merge", "skipConflicts": true}}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second["imported"], json!({"clients": 0, "projects": 0}));
    assert_eq!(second["skipped"], json!({"clients": 1, "projects": 1}));
    assert_eq!(store.total().await, 2);
}

#[tokio::test]
async fn test_import_rejects_bad_requests() {
    let store = Arc::new(MemoryStore::new());
    let base = spawn_test_server(store.clone(), TEST_BODY_LIMIT).await;
    let client = reqwest::Client::new();
    let url = format!("{}/api/v1/transfer/import", base);

    for body in [
        json!({"bundle": null}),
        json!({"bundle": {"manifest": {}}}),
        json!({"bundle": c1_p1_bundle(), "options": {"mode": "overwrite"}}),
        json!({"bundle": c1_p1_bundle(), "options": {"invoices": false}}),
    ] {
        let resp = client.post(&url).json(&body).send().await.unwrap();
        assert_eq!(resp.status(), 400, "accepted {}", body);
        let err: Value = resp.json().await.unwrap();
        assert!(err["error"].is_string());
    }
    assert_eq!(store.total().await, 0);
}

#[tokio::test]
async fn test_import_referential_errors_are_reported_in_body() {
    let base = spawn_test_server(Arc::new(MemoryStore::new()), TEST_BODY_LIMIT).await;
    let client = reqwest::Client::new();

    let result: Value = client
        .post(format!("{}/api/v1/transfer/import", base))
        .json(&json!({
            "bundle": {
                "manifest": {"version": "1.0.0"},
                "projects": [{"id": "P1", "clientId": "C9"}]
            }
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(result["success"], false);
    assert_eq!(
        result["errors"],
        json!(["projects/P1: client not found (clientId=C9)"])
    );
}

#[tokio::test]
async fn test_oversized_bundle_is_rejected() {
    let base = spawn_test_server(Arc::new(MemoryStore::new()), 256).await;
    let client = reqwest::Client::new();

    let clients: Vec<Value> = (0..50)
        .map(|i| json!({"id": format!("C{}", i), "name": "A client with a long enough name"}))
        .collect();
    let resp = client
        .post(format!("{}/api/v1/transfer/preview", base))
        .json(&json!({"manifest": {"version": "1.0.0"}, "clients": clients}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 413);
}
