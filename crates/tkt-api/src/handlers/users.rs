// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! User directory and admin account management handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tkt_core::{PublicProfile, Role, UserId};

use crate::error::ApiResult;
use crate::extractors::{AdminAuth, Auth, PathId, ValidatedJson};
use crate::state::AppState;

/// GET /users
///
/// Public profiles of every account, for picking assignees.
pub async fn list_assignable_users(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> ApiResult<Json<Vec<PublicProfile>>> {
    let users = state.users.list_assignable(&ctx.identity).await?;
    Ok(Json(users))
}

/// GET /admin/users
pub async fn list_users(
    State(state): State<AppState>,
    AdminAuth(ctx): AdminAuth,
) -> ApiResult<Json<Vec<PublicProfile>>> {
    let accounts = state.users.list(&ctx.identity).await?;
    Ok(Json(accounts.iter().map(|a| a.profile()).collect()))
}

/// Role change request body.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    /// New role.
    pub role: Role,
}

/// PUT /admin/users/{id}/role
pub async fn update_user_role(
    State(state): State<AppState>,
    AdminAuth(ctx): AdminAuth,
    PathId(id): PathId<UserId>,
    ValidatedJson(request): ValidatedJson<UpdateRoleRequest>,
) -> ApiResult<Json<PublicProfile>> {
    let account = state
        .users
        .update_role(&ctx.identity, &id, request.role)
        .await?;
    Ok(Json(account.profile()))
}

/// DELETE /admin/users/{id}
///
/// An admin cannot delete their own account.
pub async fn delete_user(
    State(state): State<AppState>,
    AdminAuth(ctx): AdminAuth,
    PathId(id): PathId<UserId>,
) -> ApiResult<StatusCode> {
    state.users.delete(&ctx.identity, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
