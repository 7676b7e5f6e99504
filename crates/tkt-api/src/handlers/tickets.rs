// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Ticket handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tkt_core::{Comment, CoreError, NewTicket, Ticket, TicketId, TicketPatch};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{Auth, Pagination, PathId, ValidatedJson};
use crate::response::TransitionsResponse;
use crate::state::AppState;

/// Maps a core error on a ticket read route, hiding denials behind 404
/// when concealment is enabled. Mutations keep their 403.
fn ticket_error(state: &AppState, err: CoreError) -> ApiError {
    concealed(state, err, "ticket")
}

pub(crate) fn concealed(state: &AppState, err: CoreError, resource: &str) -> ApiError {
    let err = ApiError::from(err);
    if state.config.conceal_forbidden_tickets {
        err.conceal_forbidden(resource)
    } else {
        err
    }
}

// =============================================================================
// Queries
// =============================================================================

/// GET /ticket/all
///
/// Lists tickets scoped to the caller's role: everything for admins, the
/// caller's own tickets for users, assigned tickets for agents.
pub async fn list_tickets(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Pagination(page): Pagination,
) -> ApiResult<Json<Vec<Ticket>>> {
    let tickets = state.tickets.list(&ctx.identity, page).await?;
    Ok(Json(tickets))
}

/// GET /ticket/assigned
///
/// Lists tickets assigned to the caller.
pub async fn list_assigned_tickets(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Pagination(page): Pagination,
) -> ApiResult<Json<Vec<Ticket>>> {
    let tickets = state
        .tickets
        .list_by_assignee(&ctx.identity, &ctx.user_id(), page)
        .await?;
    Ok(Json(tickets))
}

/// GET /ticket/{id}
pub async fn get_ticket(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    PathId(id): PathId<TicketId>,
) -> ApiResult<Json<Ticket>> {
    let ticket = state
        .tickets
        .get(&ctx.identity, &id)
        .await
        .map_err(|e| ticket_error(&state, e))?;
    Ok(Json(ticket))
}

/// GET /ticket/{id}/transitions
///
/// Returns the states the ticket may move to, current state first.
pub async fn get_transitions(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    PathId(id): PathId<TicketId>,
) -> ApiResult<Json<TransitionsResponse>> {
    let transitions = state
        .tickets
        .transitions(&ctx.identity, &id)
        .await
        .map_err(|e| ticket_error(&state, e))?;

    let current = transitions
        .first()
        .copied()
        .ok_or_else(|| ApiError::internal("ticket has no current state"))?;

    Ok(Json(TransitionsResponse {
        ticket_id: id,
        current,
        transitions,
    }))
}

/// GET /ticket/{id}/comments
pub async fn list_ticket_comments(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    PathId(id): PathId<TicketId>,
) -> ApiResult<Json<Vec<Comment>>> {
    let comments = state
        .comments
        .list(&ctx.identity, &id)
        .await
        .map_err(|e| ticket_error(&state, e))?;
    Ok(Json(comments))
}

// =============================================================================
// Mutations
// =============================================================================

/// POST /ticket
///
/// Opens a ticket owned by the caller. It starts `open` with `low` priority.
pub async fn create_ticket(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedJson(request): ValidatedJson<NewTicket>,
) -> ApiResult<impl IntoResponse> {
    let ticket = state.tickets.create(&ctx.identity, request).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// PATCH /ticket/{id}
///
/// Applies a partial update. Each present field is authorized separately
/// and state changes must follow the ticket lifecycle.
pub async fn update_ticket(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    PathId(id): PathId<TicketId>,
    ValidatedJson(patch): ValidatedJson<TicketPatch>,
) -> ApiResult<Json<Ticket>> {
    let ticket = state
        .tickets
        .patch(&ctx.identity, &id, patch)
        .await?;
    Ok(Json(ticket))
}

/// DELETE /ticket/{id}
///
/// Admin only.
pub async fn delete_ticket(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    PathId(id): PathId<TicketId>,
) -> ApiResult<StatusCode> {
    state
        .tickets
        .delete(&ctx.identity, &id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
