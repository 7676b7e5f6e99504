// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Comment handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tkt_core::{Comment, CommentId, NewComment};

use super::tickets::concealed;
use crate::error::ApiResult;
use crate::extractors::{Auth, PathId, ValidatedJson};
use crate::state::AppState;

/// POST /comment
///
/// Adds a comment to a ticket the caller may comment on.
pub async fn create_comment(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedJson(request): ValidatedJson<NewComment>,
) -> ApiResult<impl IntoResponse> {
    let comment = state
        .comments
        .create(&ctx.identity, request)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /comment/{id}
pub async fn get_comment(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    PathId(id): PathId<CommentId>,
) -> ApiResult<Json<Comment>> {
    let comment = state
        .comments
        .get(&ctx.identity, &id)
        .await
        .map_err(|e| concealed(&state, e, "comment"))?;
    Ok(Json(comment))
}
