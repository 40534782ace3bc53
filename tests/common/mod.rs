//! Shared fixtures for integration tests.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

use lws::store::{MapStore, MemoryStore};
use lws::{AppState, Config, LifecycleEvent, Lws, routes};

/// Build an activated app on top of `store`.
pub async fn test_app_with_store(store: Arc<dyn MapStore>) -> (Router, Lws) {
    let config = Config::default();
    let lws = Lws::start(store, config.index_files.clone());
    lws.handle_lifecycle(LifecycleEvent::Activate);
    lws.ready().await;

    let app = routes::app(AppState::new(lws.clone(), config));
    (app, lws)
}

pub async fn test_app() -> (Router, Lws, MemoryStore) {
    let store = MemoryStore::new();
    let (app, lws) = test_app_with_store(Arc::new(store.clone())).await;
    (app, lws, store)
}

/// Response status, Content-Type header and body.
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).unwrap()
    }
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
    let mut builder = Request::builder().uri(uri).method(method);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_string(&json).unwrap())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
        .await
        .unwrap()
        .to_vec();

    TestResponse {
        status,
        content_type,
        body,
    }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, Method::GET, uri, None).await
}

/// Post a command and wait for it to be applied.
pub async fn apply(app: &Router, command: Value) -> TestResponse {
    send(app, Method::POST, "/_lws/commands?wait=true", Some(command)).await
}
