// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Custom extractors for API handlers.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts, Path, Query},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use tkt_core::store::Page;

use crate::auth::{require_admin, verify_bearer_token, AuthContext, SessionManager};
use crate::error::ApiError;

// =============================================================================
// Auth Extractor
// =============================================================================

/// Extractor for authenticated requests.
///
/// Reads the `AuthContext` the auth layer attached to the request. When the
/// layer is not installed the bearer token is verified here instead.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(Auth(ctx): Auth) -> impl IntoResponse {
///     format!("Hello, {}", ctx.user_id())
/// }
/// ```
pub struct Auth(pub AuthContext);

impl<S> FromRequestParts<S> for Auth
where
    Arc<SessionManager>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<AuthContext>() {
            return Ok(Auth(*ctx));
        }

        let sessions = Arc::<SessionManager>::from_ref(state);
        let ctx = verify_bearer_token(sessions.codec(), &parts.headers)?;
        parts.extensions.insert(ctx);
        Ok(Auth(ctx))
    }
}

// =============================================================================
// Admin Extractor
// =============================================================================

/// Extractor for requests that must come from an admin.
pub struct AdminAuth(pub AuthContext);

impl<S> FromRequestParts<S> for AdminAuth
where
    Arc<SessionManager>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Auth(ctx) = Auth::from_request_parts(parts, state).await?;
        require_admin(&ctx)?;
        Ok(AdminAuth(ctx))
    }
}

// =============================================================================
// Validated JSON Extractor
// =============================================================================

/// Extractor for JSON payloads.
///
/// Malformed bodies become `400 BAD_REQUEST` in the API error format
/// instead of Axum's plain-text rejection.
pub struct ValidatedJson<T>(pub T);

impl<S, T> axum::extract::FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(
        req: axum::http::Request<axum::body::Body>,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e.body_text())))?;

        Ok(ValidatedJson(value))
    }
}

// =============================================================================
// Pagination Extractor
// =============================================================================

/// Query parameters for pagination.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct PaginationParams {
    /// Maximum number of records.
    pub limit: Option<usize>,
    /// Records to skip.
    pub offset: Option<usize>,
}

impl PaginationParams {
    /// Converts to a store page. Missing values fall back to the defaults.
    pub fn page(&self) -> Page {
        Page::new(
            self.limit.unwrap_or(Page::DEFAULT_LIMIT),
            self.offset.unwrap_or(0),
        )
    }
}

/// Extractor for `?limit=&offset=`.
pub struct Pagination(pub Page);

impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PaginationParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid pagination parameters: {}", e)))?;

        Ok(Pagination(params.page()))
    }
}

// =============================================================================
// Path ID Extractor
// =============================================================================

/// Extractor for a typed identifier in the `{id}` path segment.
pub struct PathId<T>(pub T);

impl<S, T> FromRequestParts<S> for PathId<T>
where
    T: FromStr + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid path: {}", e)))?;

        raw.trim()
            .parse::<T>()
            .map(PathId)
            .map_err(|_| ApiError::bad_request(format!("Invalid identifier: {}", raw)))
    }
}

// =============================================================================
// Request ID Extractor
// =============================================================================

/// Extractor for the request ID.
pub struct RequestId(pub uuid::Uuid);

impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .extensions
            .get::<AuthContext>()
            .map(|ctx| ctx.request_id)
            .unwrap_or_else(uuid::Uuid::now_v7);

        Ok(RequestId(id))
    }
}

// =============================================================================
// Client IP Extractor
// =============================================================================

/// Extractor for the client IP address.
pub struct ClientIp(pub Option<std::net::IpAddr>);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("X-Forwarded-For")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse().ok());

        if let Some(ip) = forwarded {
            return Ok(ClientIp(Some(ip)));
        }

        let real_ip = parts
            .headers
            .get("X-Real-IP")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());

        if let Some(ip) = real_ip {
            return Ok(ClientIp(Some(ip)));
        }

        let from_ctx = parts
            .extensions
            .get::<AuthContext>()
            .and_then(|ctx| ctx.client_ip);

        Ok(ClientIp(from_ctx))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let page = PaginationParams::default().page();
        assert_eq!(page, Page::default());
    }

    #[test]
    fn test_pagination_clamps_limit() {
        let params = PaginationParams {
            limit: Some(10_000),
            offset: Some(20),
        };
        let page = params.page();
        assert_eq!(page.limit, Page::MAX_LIMIT);
        assert_eq!(page.offset, 20);

        let zero = PaginationParams {
            limit: Some(0),
            offset: None,
        };
        assert_eq!(zero.page().limit, 1);
    }
}
