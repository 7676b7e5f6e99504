// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Bearer-token authentication middleware.

use std::collections::HashSet;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::{ConnectInfo, OriginalUri},
    http::{header, HeaderValue, Request},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};
use uuid::Uuid;

use crate::auth::{require_admin, verify_bearer_token, TokenCodec};
use crate::error::ApiError;

// =============================================================================
// AuthLayer
// =============================================================================

/// Layer for bearer-token authentication.
///
/// Requests to non-public paths must carry a valid access token. The
/// verified [`AuthContext`](crate::auth::AuthContext) is attached to the
/// request extensions, and every authenticated response gets
/// `Vary: Authorization`.
#[derive(Clone)]
pub struct AuthLayer {
    codec: TokenCodec,
    public_paths: Arc<HashSet<String>>,
    admin_prefixes: Arc<Vec<String>>,
}

impl AuthLayer {
    /// Creates a new auth layer. Every path is protected until
    /// [`with_public_paths`](Self::with_public_paths) says otherwise.
    pub fn new(codec: TokenCodec) -> Self {
        Self {
            codec,
            public_paths: Arc::new(HashSet::new()),
            admin_prefixes: Arc::new(Vec::new()),
        }
    }

    /// Adds paths that don't require authentication. A trailing `*`
    /// matches by prefix.
    pub fn with_public_paths(mut self, paths: Vec<String>) -> Self {
        self.public_paths = Arc::new(paths.into_iter().collect());
        self
    }

    /// Adds path prefixes that additionally require the admin role.
    pub fn with_admin_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.admin_prefixes = Arc::new(prefixes);
        self
    }

    /// Public and admin paths for an API mounted at `base_path`.
    pub fn with_default_paths(self, base_path: &str) -> Self {
        let base = base_path.trim_end_matches('/');
        self.with_public_paths(vec![
            "/health".to_string(),
            format!("{base}/health"),
            format!("{base}/login"),
            format!("{base}/refresh"),
            format!("{base}/logout"),
            format!("{base}/user"),
        ])
        .with_admin_prefixes(vec![format!("{base}/admin/")])
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            codec: self.codec.clone(),
            public_paths: self.public_paths.clone(),
            admin_prefixes: self.admin_prefixes.clone(),
        }
    }
}

// =============================================================================
// AuthMiddleware
// =============================================================================

/// Middleware for bearer-token authentication.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    codec: TokenCodec,
    public_paths: Arc<HashSet<String>>,
    admin_prefixes: Arc<Vec<String>>,
}

impl<S> AuthMiddleware<S> {
    /// Checks if a path is public.
    fn is_public_path(&self, path: &str) -> bool {
        if self.public_paths.contains(path) {
            return true;
        }

        self.public_paths.iter().any(|public_path| {
            public_path
                .strip_suffix('*')
                .is_some_and(|prefix| path.starts_with(prefix))
        })
    }

    fn is_admin_path(&self, path: &str) -> bool {
        self.admin_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let path = req
            .extensions()
            .get::<OriginalUri>()
            .map(|uri| uri.path().to_string())
            .unwrap_or_else(|| req.uri().path().to_string());
        let is_public = self.is_public_path(&path);
        let is_admin = self.is_admin_path(&path);
        let codec = self.codec.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if is_public {
                return inner.call(req).await;
            }

            let verified = verify_bearer_token(&codec, req.headers()).and_then(|ctx| {
                if is_admin {
                    require_admin(&ctx)?;
                }
                Ok(ctx)
            });

            let mut ctx = match verified {
                Ok(ctx) => ctx,
                Err(e) => {
                    tracing::debug!(path = %path, error = %e, "Request rejected by auth layer");
                    return Ok(with_vary(ApiError::from(e).into_response()));
                }
            };

            ctx = ctx.with_request_id(Uuid::now_v7());
            if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
                ctx = ctx.with_client_ip(addr.ip());
            }
            req.extensions_mut().insert(ctx);

            let response = inner.call(req).await?;
            Ok(with_vary(response))
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Marks a response as dependent on the `Authorization` header.
fn with_vary(mut response: Response) -> Response {
    response
        .headers_mut()
        .append(header::VARY, HeaderValue::from_static("Authorization"));
    response
}

// =============================================================================
// Tests
// =============================================================================
