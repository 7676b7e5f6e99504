// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Harness
//!
//! A fully wired application behind an in-process router. Requests go
//! through the same middleware stack as production via
//! `tower::ServiceExt::oneshot`; nothing binds a socket.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tower::ServiceExt;

use tkt_api::{ApiConfig, ApiServerBuilder, AppState};
use tkt_core::{Account, Ticket};

use super::builders::RequestBuilder;
use super::fixtures::{identity_of, test_api_config, Cast, TEST_PASSWORD};
use super::mocks::{FlakyTicketStore, PlainVerifier};

// =============================================================================
// TestApp
// =============================================================================

/// An application instance with seeded accounts.
pub struct TestApp {
    /// Shared state, for direct service access.
    pub state: AppState,
    /// Seeded accounts.
    pub cast: Cast,
    /// The ticket store, for failure injection.
    pub tickets: Arc<FlakyTicketStore>,
    router: Router,
}

impl TestApp {
    /// Builds an app with the default test configuration.
    pub async fn new() -> Self {
        Self::with_config(test_api_config()).await
    }

    /// Builds an app with a custom configuration.
    pub async fn with_config(config: ApiConfig) -> Self {
        let tickets = Arc::new(FlakyTicketStore::new());
        let server = ApiServerBuilder::new()
            .config(config)
            .ticket_store(tickets.clone())
            .credentials(PlainVerifier::shared())
            .build()
            .expect("server builds");

        let cast = Cast::seed(&server.state().users).await;

        Self {
            state: server.state().clone(),
            cast,
            tickets,
            router: server.router(),
        }
    }

    /// Prefixes `path` with the configured base path.
    pub fn uri(&self, path: &str) -> String {
        format!("{}{}", self.state.config.base_path, path)
    }

    /// Issues an access token for `account` with its current role.
    pub fn token_for(&self, account: &Account) -> String {
        self.state
            .codec()
            .issue_access_token(&identity_of(account))
            .expect("token issues")
    }

    /// Sends a request through the full middleware stack.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body collects")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Sends an authenticated request with an optional JSON body.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        account: &Account,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = RequestBuilder::new(method, self.uri(path)).bearer(self.token_for(account));
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.send(builder.build()).await
    }

    /// Authenticated GET.
    pub async fn get(&self, path: &str, account: &Account) -> TestResponse {
        self.call(Method::GET, path, account, None).await
    }

    /// Authenticated POST.
    pub async fn post(&self, path: &str, account: &Account, body: Value) -> TestResponse {
        self.call(Method::POST, path, account, Some(body)).await
    }

    /// Authenticated PATCH.
    pub async fn patch(&self, path: &str, account: &Account, body: Value) -> TestResponse {
        self.call(Method::PATCH, path, account, Some(body)).await
    }

    /// Authenticated PUT.
    pub async fn put(&self, path: &str, account: &Account, body: Value) -> TestResponse {
        self.call(Method::PUT, path, account, Some(body)).await
    }

    /// Authenticated DELETE.
    pub async fn delete(&self, path: &str, account: &Account) -> TestResponse {
        self.call(Method::DELETE, path, account, None).await
    }

    /// POSTs credentials to the login route.
    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        let request = RequestBuilder::post(self.uri("/login"))
            .json(json!({ "email": email, "password": password }))
            .build();
        self.send(request).await
    }

    /// Logs `account` in with the shared test password.
    pub async fn login_as(&self, account: &Account) -> TestResponse {
        self.login(&account.email, TEST_PASSWORD).await
    }

    /// Opens a ticket as `account` and returns it.
    pub async fn open_ticket(&self, account: &Account, title: &str) -> Ticket {
        let response = self
            .post("/ticket", account, json!({ "title": title, "description": "details" }))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "open ticket: {}", response.body);
        response.json()
    }
}

// =============================================================================
// TestResponse
// =============================================================================

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Parsed JSON body; `Null` when empty.
    pub body: Value,
}

impl TestResponse {
    /// Deserializes the body.
    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_value(self.body.clone()).expect("body deserializes")
    }

    /// Returns the `error.code` of an error body.
    pub fn error_code(&self) -> Option<&str> {
        self.body.pointer("/error/code").and_then(Value::as_str)
    }

    /// Returns the `Set-Cookie` header value.
    pub fn set_cookie(&self) -> Option<&str> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
    }

    /// Returns the `name=value` pair of the `Set-Cookie` header, suitable
    /// for a follow-up `Cookie` header.
    pub fn cookie_pair(&self) -> Option<String> {
        self.set_cookie()
            .and_then(|c| c.split(';').next())
            .map(|pair| pair.trim().to_string())
    }

    /// Returns the access token of a login or refresh body.
    pub fn access_token(&self) -> Option<&str> {
        self.body.get("access_token").and_then(Value::as_str)
    }
}
