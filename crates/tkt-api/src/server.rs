// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server implementation.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::handlers;
use crate::middleware::AuthLayer;
use crate::state::{AppState, AppStateBuilder};

// =============================================================================
// ApiServer
// =============================================================================

/// The API server.
///
/// This is the main entry point for creating and running the HTTP server.
pub struct ApiServer {
    state: AppState,
    config: Arc<ApiConfig>,
}

impl ApiServer {
    /// Creates a new API server with the given state.
    pub fn new(state: AppState) -> Self {
        let config = state.config.clone();
        Self { state, config }
    }

    /// Returns the shared application state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Creates the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let cors = create_cors_layer(&self.config);
        let auth = AuthLayer::new(self.state.codec().clone())
            .with_default_paths(&self.config.base_path);

        let middleware_stack = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(TimeoutLayer::with_status_code(
                axum::http::StatusCode::REQUEST_TIMEOUT,
                self.config.request_timeout,
            ))
            .layer(cors)
            .layer(DefaultBodyLimit::max(self.config.max_body_size))
            .layer(auth);

        let api = api_routes();
        let base = self.config.base_path.trim_end_matches('/');
        let router = if base.is_empty() {
            api
        } else {
            Router::new()
                .nest(base, api)
                .route("/health", get(handlers::health))
        };

        router
            .layer(middleware_stack)
            .with_state(self.state.clone())
    }

    /// Runs the server.
    pub async fn run(self) -> ApiResult<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Runs the server with graceful shutdown.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let addr = self.config.socket_addr();
        let router = self.router();

        info!(address = %addr, base_path = %self.config.base_path, "Starting API server");

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind {}: {}", addr, e)))?;

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ApiError::internal(format!("Server error: {}", e)))?;

        info!("API server shutdown complete");

        Ok(())
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.config.socket_addr()
    }
}

// =============================================================================
// Routes
// =============================================================================

/// Routes relative to the API base path.
fn api_routes() -> Router<AppState> {
    Router::new()
        // Public
        .route("/health", get(handlers::health))
        .route("/login", post(handlers::login))
        .route("/refresh", get(handlers::refresh))
        .route("/logout", get(handlers::logout))
        .route("/user", post(handlers::signup))
        // Authenticated
        .route("/me", get(handlers::current_user))
        .route("/users", get(handlers::list_assignable_users))
        .route("/ticket", post(handlers::create_ticket))
        .route("/ticket/all", get(handlers::list_tickets))
        .route("/ticket/assigned", get(handlers::list_assigned_tickets))
        .route(
            "/ticket/{id}",
            get(handlers::get_ticket)
                .patch(handlers::update_ticket)
                .delete(handlers::delete_ticket),
        )
        .route("/ticket/{id}/comments", get(handlers::list_ticket_comments))
        .route("/ticket/{id}/transitions", get(handlers::get_transitions))
        .route("/comment", post(handlers::create_comment))
        .route("/comment/{id}", get(handlers::get_comment))
        // Admin
        .route("/admin/users", get(handlers::list_users))
        .route("/admin/users/{id}/role", put(handlers::update_user_role))
        .route("/admin/users/{id}", axum::routing::delete(handlers::delete_user))
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Creates the CORS layer from configuration.
///
/// A wildcard origin disables credentials; explicit origins allow the
/// refresh cookie to be sent cross-origin.
fn create_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = &config.cors;

    let layer = CorsLayer::new()
        .max_age(Duration::from_secs(cors.max_age))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    if cors.is_wildcard() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(origins).allow_credentials(true)
}

// =============================================================================
// Server Builder
// =============================================================================

/// Builder for creating the API server.
#[derive(Default)]
pub struct ApiServerBuilder {
    state_builder: AppStateBuilder,
}

impl ApiServerBuilder {
    /// Creates a new server builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.state_builder = self.state_builder.config(config);
        self
    }

    /// Sets the account store.
    pub fn subject_store(mut self, store: tkt_core::store::SharedSubjectStore) -> Self {
        self.state_builder = self.state_builder.subject_store(store);
        self
    }

    /// Sets the ticket store.
    pub fn ticket_store(mut self, store: tkt_core::store::SharedTicketStore) -> Self {
        self.state_builder = self.state_builder.ticket_store(store);
        self
    }

    /// Sets the comment store.
    pub fn comment_store(mut self, store: tkt_core::store::SharedCommentStore) -> Self {
        self.state_builder = self.state_builder.comment_store(store);
        self
    }

    /// Sets the credential verifier.
    pub fn credentials(mut self, verifier: tkt_core::SharedCredentialVerifier) -> Self {
        self.state_builder = self.state_builder.credentials(verifier);
        self
    }

    /// Builds the server.
    pub fn build(self) -> ApiResult<ApiServer> {
        let state = self.state_builder.build()?;
        Ok(ApiServer::new(state))
    }
}

// =============================================================================
// Tests
// =============================================================================
