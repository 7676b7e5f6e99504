// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Ticket service and mutation orchestrator.
//!
//! Every update runs the same pipeline:
//!
//! 1. load the current ticket (missing is `NotFound`, never a denial)
//! 2. check the caller may edit the ticket at all
//! 3. check each changed field against the policy table
//! 4. validate a state change through the lifecycle
//! 5. force `Pending` when the first assignee arrives, re-validating that
//!    move from the current state
//! 6. stamp `updated_at`, keep identity fields from the loaded record
//! 7. persist with compare-and-swap on the loaded `updated_at`

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::error::{CoreError, CoreResult, StoreError};
use crate::lifecycle;
use crate::policy::{self, ListScope, TicketAction};
use crate::store::{Page, SharedCommentStore, SharedSubjectStore, SharedTicketStore};
use crate::ticket::{NewTicket, Ticket, TicketField, TicketPatch, TicketState};
use crate::types::{Identity, Role, TicketId, UserId};

/// Ticket operations gated by the access policy.
#[derive(Clone)]
pub struct TicketService {
    tickets: SharedTicketStore,
    subjects: SharedSubjectStore,
    comments: SharedCommentStore,
}

impl TicketService {
    /// Creates a new ticket service. `comments` is cleared on ticket deletion.
    pub fn new(
        tickets: SharedTicketStore,
        subjects: SharedSubjectStore,
        comments: SharedCommentStore,
    ) -> Self {
        Self {
            tickets,
            subjects,
            comments,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Fetches a ticket the caller may view.
    pub async fn get(&self, identity: &Identity, id: &TicketId) -> CoreResult<Ticket> {
        let ticket = self.tickets.get(id).await?;
        policy::authorize(identity, TicketAction::View, &ticket)?;
        Ok(ticket)
    }

    /// Lists the tickets visible to the caller's role.
    pub async fn list(&self, identity: &Identity, page: Page) -> CoreResult<Vec<Ticket>> {
        let tickets = match policy::list_scope(identity)? {
            ListScope::All => self.tickets.list_all(page).await?,
            ListScope::CreatedBy(creator) => self.tickets.list_by_creator(&creator, page).await?,
            ListScope::AssignedTo(assignee) => {
                self.tickets.list_by_assignee(&assignee, page).await?
            }
        };
        Ok(tickets)
    }

    /// Lists tickets opened by `creator`.
    pub async fn list_by_creator(
        &self,
        identity: &Identity,
        creator: &UserId,
        page: Page,
    ) -> CoreResult<Vec<Ticket>> {
        if !policy::can_list_for(identity, creator) {
            return Err(CoreError::AccessDenied);
        }
        Ok(self.tickets.list_by_creator(creator, page).await?)
    }

    /// Lists tickets assigned to `assignee`.
    pub async fn list_by_assignee(
        &self,
        identity: &Identity,
        assignee: &UserId,
        page: Page,
    ) -> CoreResult<Vec<Ticket>> {
        if !policy::can_list_for(identity, assignee) {
            return Err(CoreError::AccessDenied);
        }
        Ok(self.tickets.list_by_assignee(assignee, page).await?)
    }

    /// Returns the states the caller could pick for a ticket: the current
    /// state followed by every state reachable from it.
    pub async fn transitions(
        &self,
        identity: &Identity,
        id: &TicketId,
    ) -> CoreResult<Vec<TicketState>> {
        let ticket = self.get(identity, id).await?;
        Ok(lifecycle::valid_transitions(ticket.state))
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Opens a ticket. It always starts `Open`, `Low` and unassigned.
    pub async fn create(&self, identity: &Identity, request: NewTicket) -> CoreResult<Ticket> {
        if identity.role == Role::Unknown {
            return Err(CoreError::AccessDenied);
        }
        request.validate()?;

        let ticket = Ticket::open(identity.subject, request.title.trim(), request.description);
        let ticket = self.tickets.create(ticket).await?;
        info!(ticket_id = %ticket.id, subject = %identity.subject, "Ticket created");
        Ok(ticket)
    }

    /// Applies a partial update.
    pub async fn patch(
        &self,
        identity: &Identity,
        id: &TicketId,
        patch: TicketPatch,
    ) -> CoreResult<Ticket> {
        let fields = patch.changed_fields();
        if fields.is_empty() {
            return Err(CoreError::validation("no fields provided to update"));
        }
        let current = self.tickets.get(id).await?;
        let proposed = patch.apply_to(&current);
        self.apply_update(identity, current, &fields, proposed).await
    }

    /// Updates a ticket from an explicit set of changed fields and the
    /// caller's proposed ticket. Only the listed fields are read from
    /// `proposed`.
    pub async fn update(
        &self,
        identity: &Identity,
        id: &TicketId,
        fields: &BTreeSet<TicketField>,
        proposed: Ticket,
    ) -> CoreResult<Ticket> {
        let current = self.tickets.get(id).await?;
        self.apply_update(identity, current, fields, proposed).await
    }

    /// Deletes a ticket and its comments. Admin only.
    pub async fn delete(&self, identity: &Identity, id: &TicketId) -> CoreResult<()> {
        let ticket = self.tickets.get(id).await?;
        policy::authorize(identity, TicketAction::Delete, &ticket)?;
        self.tickets.delete(id).await?;
        let comments = self.comments.delete_by_ticket(id).await?;
        info!(ticket_id = %id, subject = %identity.subject, comments, "Ticket deleted");
        Ok(())
    }

    async fn apply_update(
        &self,
        identity: &Identity,
        current: Ticket,
        fields: &BTreeSet<TicketField>,
        proposed: Ticket,
    ) -> CoreResult<Ticket> {
        policy::authorize(identity, TicketAction::UpdateContent, &current)?;
        policy::authorize_fields(identity, &current, fields)?;

        let mut next = merge_fields(&current, &proposed, fields);

        if next.title.trim().is_empty() {
            return Err(CoreError::validation("title must not be empty"));
        }

        if next.state != current.state {
            debug!(
                ticket_id = %current.id,
                from = %current.state,
                to = %next.state,
                "Attempting state transition"
            );
            lifecycle::ensure_transition(current.state, next.state)?;
        }

        if fields.contains(&TicketField::AssignedTo) {
            self.ensure_assignees_exist(&next.assigned_to).await?;
        }

        if current.is_unassigned() && !next.is_unassigned() {
            lifecycle::ensure_transition(current.state, TicketState::Pending)?;
            next.state = TicketState::Pending;
        }

        next.id = current.id;
        next.created_by = current.created_by;
        next.created_at = current.created_at;
        next.updated_at = next_timestamp(current.updated_at);

        let updated = self.tickets.update(next, current.updated_at).await?;
        info!(
            ticket_id = %updated.id,
            subject = %identity.subject,
            state = %updated.state,
            fields = ?fields.iter().map(|f| f.as_str()).collect::<Vec<_>>(),
            "Ticket updated"
        );
        Ok(updated)
    }

    async fn ensure_assignees_exist(&self, assignees: &BTreeSet<UserId>) -> CoreResult<()> {
        for assignee in assignees {
            match self.subjects.get_by_id(assignee).await {
                Ok(_) => {}
                Err(StoreError::NotFound { .. }) => {
                    return Err(CoreError::validation(format!(
                        "assignee {assignee} does not exist"
                    )));
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}

/// Takes the listed fields from `proposed` and everything else from `current`.
fn merge_fields(current: &Ticket, proposed: &Ticket, fields: &BTreeSet<TicketField>) -> Ticket {
    let mut next = current.clone();
    for field in fields {
        match field {
            TicketField::Title => next.title = proposed.title.trim().to_string(),
            TicketField::Description => next.description = proposed.description.clone(),
            TicketField::State => next.state = proposed.state,
            TicketField::Priority => next.priority = proposed.priority,
            TicketField::AssignedTo => next.assigned_to = proposed.assigned_to.clone(),
        }
    }
    next
}

/// `now`, bumped past `previous` so the concurrency token always moves.
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Account;
    use crate::comment::Comment;
    use crate::store::{
        CommentStore, InMemoryCommentStore, InMemorySubjectStore, InMemoryTicketStore,
        SubjectStore,
    };
    use crate::ticket::TicketPriority;
    use std::sync::Arc;

    struct Fixture {
        service: TicketService,
        comments: Arc<InMemoryCommentStore>,
        user: Identity,
        agent: Identity,
        admin: Identity,
    }

    async fn fixture() -> Fixture {
        let subjects = Arc::new(InMemorySubjectStore::new());
        let mut ids = Vec::new();
        for (email, role) in [
            ("user@example.com", Role::User),
            ("agent@example.com", Role::Agent),
            ("admin@example.com", Role::Admin),
        ] {
            let account = subjects.create(Account::new(email, "h", role)).await.unwrap();
            ids.push(Identity::new(account.id, role));
        }
        let comments = Arc::new(InMemoryCommentStore::new());
        let service = TicketService::new(
            Arc::new(InMemoryTicketStore::new()),
            subjects,
            comments.clone(),
        );
        Fixture {
            service,
            comments,
            user: ids[0],
            agent: ids[1],
            admin: ids[2],
        }
    }

    #[tokio::test]
    async fn test_create_forces_initial_shape() {
        let f = fixture().await;
        let ticket = f
            .service
            .create(&f.user, NewTicket::new("  Laptop  ", "won't boot"))
            .await
            .unwrap();
        assert_eq!(ticket.title, "Laptop");
        assert_eq!(ticket.state, TicketState::Open);
        assert_eq!(ticket.priority, TicketPriority::Low);
        assert_eq!(ticket.created_by, f.user.subject);
        assert!(ticket.is_unassigned());
    }

    #[tokio::test]
    async fn test_full_assignment_scenario() {
        let f = fixture().await;
        let ticket = f
            .service
            .create(&f.user, NewTicket::new("Email", "bouncing"))
            .await
            .unwrap();

        // Unassigned agent cannot resolve.
        let err = f
            .service
            .patch(&f.agent, &ticket.id, TicketPatch::new().with_state(TicketState::Resolved))
            .await
            .unwrap_err();
        assert!(err.is_access_denied());

        // Admin assigns: forced to Pending.
        let assigned = f
            .service
            .patch(&f.admin, &ticket.id, TicketPatch::new().with_assignees([f.agent.subject]))
            .await
            .unwrap();
        assert_eq!(assigned.state, TicketState::Pending);
        assert!(assigned.is_assignee(&f.agent.subject));

        let resolved = f
            .service
            .patch(&f.agent, &ticket.id, TicketPatch::new().with_state(TicketState::Resolved))
            .await
            .unwrap();
        assert_eq!(resolved.state, TicketState::Resolved);

        let closed = f
            .service
            .patch(&f.agent, &ticket.id, TicketPatch::new().with_state(TicketState::Closed))
            .await
            .unwrap();
        assert_eq!(closed.state, TicketState::Closed);
        assert_eq!(closed.created_at, ticket.created_at);
        assert!(closed.updated_at > ticket.updated_at);
    }

    #[tokio::test]
    async fn test_unchanged_state_is_not_a_transition() {
        let f = fixture().await;
        let ticket = f
            .service
            .create(&f.user, NewTicket::new("t", ""))
            .await
            .unwrap();
        let updated = f
            .service
            .patch(&f.admin, &ticket.id, TicketPatch::new().with_state(TicketState::Open))
            .await
            .unwrap();
        assert_eq!(updated.state, TicketState::Open);
    }

    #[tokio::test]
    async fn test_invalid_transition_rejected() {
        let f = fixture().await;
        let ticket = f.service.create(&f.user, NewTicket::new("t", "")).await.unwrap();
        let err = f
            .service
            .patch(&f.admin, &ticket.id, TicketPatch::new().with_state(TicketState::Closed))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidTransition {
                from: TicketState::Open,
                to: TicketState::Closed
            }
        ));
    }

    #[tokio::test]
    async fn test_assignment_cannot_revive_terminal_ticket() {
        let f = fixture().await;
        let ticket = f.service.create(&f.user, NewTicket::new("t", "")).await.unwrap();
        f.service
            .patch(&f.admin, &ticket.id, TicketPatch::new().with_state(TicketState::Cancelled))
            .await
            .unwrap();

        let err = f
            .service
            .patch(&f.admin, &ticket.id, TicketPatch::new().with_assignees([f.agent.subject]))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_creator_cannot_change_priority() {
        let f = fixture().await;
        let ticket = f.service.create(&f.user, NewTicket::new("t", "")).await.unwrap();
        let err = f
            .service
            .patch(
                &f.user,
                &ticket.id,
                TicketPatch::new()
                    .with_title("new title")
                    .with_priority(TicketPriority::Critical),
            )
            .await
            .unwrap_err();
        assert!(err.is_access_denied());

        // Nothing was persisted.
        let stored = f.service.get(&f.user, &ticket.id).await.unwrap();
        assert_eq!(stored.title, "t");
    }

    #[tokio::test]
    async fn test_update_reads_only_listed_fields() {
        let f = fixture().await;
        let ticket = f.service.create(&f.user, NewTicket::new("t", "")).await.unwrap();

        let mut proposed = ticket.clone();
        proposed.title = "renamed".into();
        proposed.priority = TicketPriority::Critical;

        let fields = BTreeSet::from([TicketField::Title]);
        let updated = f
            .service
            .update(&f.user, &ticket.id, &fields, proposed)
            .await
            .unwrap();
        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.priority, TicketPriority::Low);
    }

    #[tokio::test]
    async fn test_empty_patch_is_validation_error() {
        let f = fixture().await;
        let ticket = f.service.create(&f.user, NewTicket::new("t", "")).await.unwrap();
        let err = f
            .service
            .patch(&f.user, &ticket.id, TicketPatch::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_missing_ticket_is_not_found_before_denial() {
        let f = fixture().await;
        let err = f
            .service
            .patch(&f.user, &TicketId::new(), TicketPatch::new().with_title("x"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_unknown_assignee_rejected() {
        let f = fixture().await;
        let ticket = f.service.create(&f.user, NewTicket::new("t", "")).await.unwrap();
        let err = f
            .service
            .patch(&f.admin, &ticket.id, TicketPatch::new().with_assignees([UserId::new()]))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_list_is_role_scoped() {
        let f = fixture().await;
        let mine = f.service.create(&f.user, NewTicket::new("mine", "")).await.unwrap();
        f.service.create(&f.admin, NewTicket::new("admin's", "")).await.unwrap();
        f.service
            .patch(&f.admin, &mine.id, TicketPatch::new().with_assignees([f.agent.subject]))
            .await
            .unwrap();

        assert_eq!(f.service.list(&f.admin, Page::default()).await.unwrap().len(), 2);
        let users = f.service.list(&f.user, Page::default()).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, mine.id);
        assert_eq!(f.service.list(&f.agent, Page::default()).await.unwrap().len(), 1);

        let err = f
            .service
            .list_by_creator(&f.user, &f.admin.subject, Page::default())
            .await
            .unwrap_err();
        assert!(err.is_access_denied());
    }

    #[tokio::test]
    async fn test_delete_admin_only() {
        let f = fixture().await;
        let ticket = f.service.create(&f.user, NewTicket::new("t", "")).await.unwrap();
        assert!(f.service.delete(&f.user, &ticket.id).await.unwrap_err().is_access_denied());
        f.service.delete(&f.admin, &ticket.id).await.unwrap();
        assert!(f.service.get(&f.admin, &ticket.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_removes_comments() {
        let f = fixture().await;
        let doomed = f.service.create(&f.user, NewTicket::new("t", "")).await.unwrap();
        let kept = f.service.create(&f.user, NewTicket::new("k", "")).await.unwrap();
        for ticket in [&doomed, &doomed, &kept] {
            f.comments
                .create(Comment::new(ticket.id, f.user.subject, "note"))
                .await
                .unwrap();
        }

        f.service.delete(&f.admin, &doomed.id).await.unwrap();
        assert!(f.comments.list_by_ticket(&doomed.id).await.unwrap().is_empty());
        assert_eq!(f.comments.list_by_ticket(&kept.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_transitions_for_viewer() {
        let f = fixture().await;
        let ticket = f.service.create(&f.user, NewTicket::new("t", "")).await.unwrap();
        let states = f.service.transitions(&f.user, &ticket.id).await.unwrap();
        assert_eq!(
            states,
            vec![TicketState::Open, TicketState::Pending, TicketState::Cancelled]
        );
        assert!(f
            .service
            .transitions(&f.agent, &ticket.id)
            .await
            .unwrap_err()
            .is_access_denied());
    }
}
