//! End-to-end tests for the settings API, driven over real HTTP against a
//! server bound to an ephemeral port.

use crate::*;
use serde_json::{Value, json};
use std::sync::Arc;

struct TestServer {
    base: String,
    token: String,
    client: reqwest::Client,
    _dir: tempfile::TempDir,
}

impl TestServer {
    async fn spawn() -> Self {
        let (db, dir) = crate::testing::sqlite_db().await;
        migrate::init(&db).await.expect("migrate init");

        let state = AppState::new(Arc::new(db));
        let token = state.tokens.issue().await;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener addr");
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.expect("serve");
        });

        Self {
            base: format!("http://{addr}{API_PREFIX}"),
            token,
            client: reqwest::Client::new(),
            _dir: dir,
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}{path}", self.base))
            .header("Authorization", format!("Bearer {}", self.token))
    }

    fn put(&self, path: &str, token: &str, body: &Value) -> reqwest::RequestBuilder {
        self.client
            .put(format!("{}{path}", self.base))
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
    }
}

fn assert_json_content_type(response: &reqwest::Response) {
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    assert!(content_type.contains("application/json"), "{content_type}");
}

fn assert_error_body(body: &Value) {
    let error = body["errors"][0]
        .as_object()
        .expect("errors[0] must be an object");
    assert!(error.contains_key("message"));
    assert!(error.contains_key("type"));
}

#[tokio::test]
async fn can_retrieve_all_settings() {
    let server = TestServer::spawn().await;

    let response = server.get("/settings/").send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_json_content_type(&response);
    assert!(response.headers().get("x-cache-invalidate").is_none());

    let body: Value = response.json().await.unwrap();
    let settings = body["settings"].as_array().expect("settings array");
    assert!(!settings.is_empty());
}

#[tokio::test]
async fn can_retrieve_a_setting() {
    let server = TestServer::spawn().await;

    let response = server.get("/settings/title/").send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_json_content_type(&response);
    assert!(response.headers().get("x-cache-invalidate").is_none());

    let body: Value = response.json().await.unwrap();
    let setting = body["settings"][0].as_object().expect("settings[0]");

    let mut fields: Vec<&str> = setting.keys().map(String::as_str).collect();
    fields.sort_unstable();
    let mut expected = vec![
        "id",
        "uuid",
        "key",
        "value",
        "type",
        "created_at",
        "created_by",
        "updated_at",
        "updated_by",
    ];
    expected.sort_unstable();
    assert_eq!(fields, expected);

    assert_eq!(setting["key"], "title");
    let created_at = setting["created_at"].as_str().unwrap();
    assert!(
        chrono::DateTime::parse_from_rfc3339(created_at).is_ok(),
        "created_at must be ISO-8601, got {created_at}"
    );
}

#[tokio::test]
async fn cant_retrieve_non_existent_setting() {
    let server = TestServer::spawn().await;

    let response = server.get("/settings/testsetting/").send().await.unwrap();
    assert_eq!(response.status().as_u16(), 404);
    assert_json_content_type(&response);
    assert!(response.headers().get("x-cache-invalidate").is_none());

    let body: Value = response.json().await.unwrap();
    assert_error_body(&body);
}

#[tokio::test]
async fn can_edit_settings() {
    let server = TestServer::spawn().await;

    let changed = "Quill changed";
    let patch = json!({ "settings": [{ "key": "title", "value": changed }] });
    let response = server
        .put("/settings/", &server.token, &patch)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_json_content_type(&response);

    let invalidate = response
        .headers()
        .get("x-cache-invalidate")
        .and_then(|value| value.to_str().ok());
    assert_eq!(invalidate, Some("/*"));

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["settings"][0]["value"], changed);

    // the edit must be visible on a fresh read
    let response = server.get("/settings/title/").send().await.unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["settings"][0]["value"], changed);
}

#[tokio::test]
async fn cant_edit_settings_with_invalid_accesstoken() {
    let server = TestServer::spawn().await;

    let patch = json!({ "settings": [{ "key": "title", "value": "Quill changed" }] });
    let response = server
        .put("/settings/", "invalidtoken", &patch)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
    assert!(response.headers().get("x-cache-invalidate").is_none());

    let body: Value = response.json().await.unwrap();
    assert_error_body(&body);
}

#[tokio::test]
async fn cant_edit_non_existent_setting() {
    let server = TestServer::spawn().await;

    let patch = json!({ "settings": [{ "key": "testvalue", "value": "new value" }] });
    let response = server
        .put("/settings/", &server.token, &patch)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
    assert_json_content_type(&response);
    assert!(response.headers().get("x-cache-invalidate").is_none());

    let body: Value = response.json().await.unwrap();
    assert_error_body(&body);
}

#[tokio::test]
async fn requests_without_a_token_are_unauthorized() {
    let server = TestServer::spawn().await;

    let response = server
        .client
        .get(format!("{}/settings/", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["errors"][0]["type"], "UnauthorizedError");
}
