//! Tests for the HTTP remote store against a mock server

mod common;

use chrono::Utc;
use neurolift_client::config::RemoteConfig;
use neurolift_client::error::ClientError;
use neurolift_client::remote::{HttpRemoteStore, RemoteStore};
use neurolift_client::repositories::Collection;
use neurolift_client::services::{SyncService, TemplateService};
use neurolift_client::state::AppState;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn remote_config(server: &MockServer) -> RemoteConfig {
    RemoteConfig {
        base_url: server.uri(),
        user_id: Some("u1".to_string()),
        api_key: Some("secret-token".to_string()),
        timeout_secs: 5,
    }
}

#[tokio::test]
async fn test_put_sends_body_with_synced_at() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/users/u1/templates/t1"))
        .and(header("authorization", "Bearer secret-token"))
        .and(body_partial_json(json!({"id": "t1", "name": "Legs"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = HttpRemoteStore::new(&remote_config(&server)).unwrap();
    store
        .put_document("u1", Collection::Templates, "t1", &json!({"id": "t1", "name": "Legs"}))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body["syncedAt"].is_string());
}

#[tokio::test]
async fn test_list_returns_documents() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/u1/journal"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "j1", "date": "2025-03-01"},
            {"id": "j2", "date": "2025-02-28"}
        ])))
        .mount(&server)
        .await;

    let store = HttpRemoteStore::new(&remote_config(&server)).unwrap();
    let docs = store.list_documents("u1", Collection::Journal).await.unwrap();

    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0]["id"], "j1");
}

#[tokio::test]
async fn test_delete_treats_missing_as_success() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/users/u1/workouts/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let store = HttpRemoteStore::new(&remote_config(&server)).unwrap();
    assert!(store
        .delete_document("u1", Collection::Workouts, "gone")
        .await
        .is_ok());
}

#[tokio::test]
async fn test_error_status_maps_to_remote_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/u1/workouts"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let store = HttpRemoteStore::new(&remote_config(&server)).unwrap();
    let err = store.list_documents("u1", Collection::Workouts).await.unwrap_err();

    match err {
        ClientError::Remote { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "forbidden");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_full_sync_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/users/u1/templates/t-local"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/u1/templates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "t-cloud",
            "name": "Cloud Day",
            "exercises": ["Pull-up"],
            "createdAt": "2025-02-01T10:00:00Z",
            "updatedAt": "2025-02-01T10:00:00Z"
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/u1/workouts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/u1/journal"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let mut config = common::test_config(Some("u1"));
    config.remote = remote_config(&server);
    let base = common::TestApp::with_config(config.clone()).await;
    let remote: Arc<dyn RemoteStore> = Arc::new(HttpRemoteStore::new(&config.remote).unwrap());
    let state = AppState::new(base.pool().clone(), config, remote);

    let mut template = TemplateService::create(state.db(), "Local Day", vec!["Dip".to_string()], Utc::now())
        .await
        .unwrap();
    // Give the local record a predictable id for the mock
    neurolift_client::repositories::DocumentRepository::delete_hard(state.db(), Collection::Templates, &template.id)
        .await
        .unwrap();
    template.id = "t-local".to_string();
    neurolift_client::repositories::DocumentRepository::save(state.db(), Collection::Templates, &template)
        .await
        .unwrap();

    let report = SyncService::sync(&state).await.unwrap();

    assert!(report.is_success(), "{:?}", report.first_error());
    assert_eq!(report.pushed(), 1);
    let names: Vec<String> = TemplateService::list(state.db())
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Cloud Day".to_string()));
    assert!(names.contains(&"Local Day".to_string()));
}
