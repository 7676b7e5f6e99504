// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session and account handlers.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tkt_core::{PublicProfile, Signup};

use crate::auth::IssuedSession;
use crate::error::{ApiError, ApiResult};
use crate::extractors::{Auth, ClientIp, ValidatedJson};
use crate::response::{AuthResponse, MessageResponse};
use crate::state::AppState;

// =============================================================================
// Login
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Password.
    pub password: String,
}

/// POST /login
///
/// Authenticates by email and password. Returns the access token in the
/// body and sets the refresh cookie.
pub async fn login(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let session = state.sessions.login(&request.email, &request.password).await?;
    let account = state.users.me(&session.identity).await?;

    tracing::info!(
        user_id = %session.identity.subject,
        client_ip = ?client_ip,
        "Login succeeded"
    );

    let body = AuthResponse::from_session(&session, state.codec().access_ttl_secs())
        .with_user(account.profile());
    Ok(session_response(&session, body))
}

// =============================================================================
// Refresh
// =============================================================================

/// GET /refresh
///
/// Rotates the session using the refresh cookie. The role in the new
/// access token is re-read from the account store.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let session = state.sessions.refresh_from_headers(&headers).await?;
    let body = AuthResponse::from_session(&session, state.codec().access_ttl_secs());
    Ok(session_response(&session, body))
}

// =============================================================================
// Logout
// =============================================================================

/// GET /logout
///
/// Clears the refresh cookie. Access tokens stay valid until they expire.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    tracing::info!("Session cookie cleared");
    (
        StatusCode::OK,
        [(header::SET_COOKIE, state.sessions.logout())],
        Json(MessageResponse::new("logged out")),
    )
}

// =============================================================================
// Signup
// =============================================================================

/// POST /user
///
/// Registers an account with the `user` role.
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<Signup>,
) -> ApiResult<impl IntoResponse> {
    let account = state.users.signup(request).await?;
    Ok((StatusCode::CREATED, Json(account.profile())))
}

// =============================================================================
// Current User
// =============================================================================

/// GET /me
///
/// Returns the caller's own profile.
pub async fn current_user(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> ApiResult<Json<PublicProfile>> {
    let account = state.users.me(&ctx.identity).await?;
    Ok(Json(account.profile()))
}

// =============================================================================
// Helper Functions
// =============================================================================

fn session_response(session: &IssuedSession, body: AuthResponse) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, session.set_cookie.clone())],
        Json(body),
    )
}
