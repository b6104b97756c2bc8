#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt;

use todo_api::auth::JwtSettings;
use todo_api::database::MemoryStore;
use todo_api::{app, AppState};

pub const SECRET: &str = "integration-test-secret";

/// One isolated app per test: its own store, its own router state.
pub struct TestApp {
    pub store: MemoryStore,
    pub state: AppState,
    pub jwt: JwtSettings,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    /// Users "admin" (items 1..=3) and "guest" (no items).
    pub async fn seeded() -> Result<Self> {
        let store = MemoryStore::new();
        store.add_user("admin").await?;
        store.add_user("guest").await?;
        store.add_item("admin", "buy groceries", false).await?;
        store.add_item("admin", "walk the dog", true).await?;
        store.add_item("admin", "file taxes", false).await?;

        let jwt = JwtSettings::new(SECRET, None, 1);
        let state = AppState::new(Arc::new(store.clone()), jwt.clone());
        Ok(Self { store, state, jwt })
    }

    pub fn token(&self, username: &str) -> Result<String> {
        Ok(self.jwt.issue_token(username)?)
    }

    /// Send a request as `username` (or anonymously) through the router.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        username: Option<&str>,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(username) = username {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token(username)?));
        }
        self.dispatch(builder, body).await
    }

    pub async fn send_with_header(
        &self,
        method: Method,
        uri: &str,
        authorization: &str,
    ) -> Result<TestResponse> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, authorization);
        self.dispatch(builder, None).await
    }

    async fn dispatch(
        &self,
        builder: axum::http::request::Builder,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        let response = app(self.state.clone()).oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok(TestResponse { status, headers, body })
    }
}
