// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Comment service.

use tracing::info;

use crate::comment::{Comment, NewComment};
use crate::error::{CoreError, CoreResult, StoreError};
use crate::policy::{self, TicketAction};
use crate::store::{SharedCommentStore, SharedTicketStore};
use crate::types::{CommentId, Identity, TicketId};

/// Comment operations. Access follows the parent ticket.
#[derive(Clone)]
pub struct CommentService {
    comments: SharedCommentStore,
    tickets: SharedTicketStore,
}

impl CommentService {
    /// Creates a new comment service.
    pub fn new(comments: SharedCommentStore, tickets: SharedTicketStore) -> Self {
        Self { comments, tickets }
    }

    /// Posts a comment. The caller must be allowed to comment on the ticket.
    pub async fn create(&self, identity: &Identity, request: NewComment) -> CoreResult<Comment> {
        request.validate()?;
        let ticket = self.tickets.get(&request.ticket_id).await?;
        policy::authorize(identity, TicketAction::Comment, &ticket)?;

        let comment = Comment::new(ticket.id, identity.subject, request.description.trim());
        let comment = self.comments.create(comment).await?;
        info!(
            comment_id = %comment.id,
            ticket_id = %ticket.id,
            subject = %identity.subject,
            "Comment created"
        );
        Ok(comment)
    }

    /// Lists the comments of a ticket the caller may view.
    pub async fn list(&self, identity: &Identity, ticket_id: &TicketId) -> CoreResult<Vec<Comment>> {
        let ticket = self.tickets.get(ticket_id).await?;
        policy::authorize(identity, TicketAction::View, &ticket)?;
        Ok(self.comments.list_by_ticket(ticket_id).await?)
    }

    /// Fetches a single comment whose ticket the caller may view.
    pub async fn get(&self, identity: &Identity, id: &CommentId) -> CoreResult<Comment> {
        let comment = self.comments.get(id).await?;
        let ticket = match self.tickets.get(&comment.ticket_id).await {
            Ok(ticket) => ticket,
            Err(StoreError::NotFound { .. }) => return Err(CoreError::not_found("comment")),
            Err(err) => return Err(err.into()),
        };
        policy::authorize(identity, TicketAction::View, &ticket)?;
        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryCommentStore, InMemoryTicketStore, TicketStore};
    use crate::ticket::Ticket;
    use crate::types::{Role, UserId};
    use std::sync::Arc;

    async fn setup() -> (CommentService, Ticket, Identity, Identity) {
        let tickets = Arc::new(InMemoryTicketStore::new());
        let creator = Identity::new(UserId::new(), Role::User);
        let agent = Identity::new(UserId::new(), Role::Agent);
        let mut ticket = Ticket::open(creator.subject, "t", "");
        ticket.assigned_to.insert(agent.subject);
        let ticket = tickets.create(ticket).await.unwrap();
        let service = CommentService::new(Arc::new(InMemoryCommentStore::new()), tickets);
        (service, ticket, creator, agent)
    }

    fn request(ticket_id: TicketId, description: &str) -> NewComment {
        NewComment {
            ticket_id,
            description: description.into(),
        }
    }

    #[tokio::test]
    async fn test_creator_and_assignee_can_comment() {
        let (service, ticket, creator, agent) = setup().await;
        service.create(&creator, request(ticket.id, "any news?")).await.unwrap();
        service.create(&agent, request(ticket.id, "on it")).await.unwrap();

        let comments = service.list(&creator, &ticket.id).await.unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[1].created_by, agent.subject);
    }

    #[tokio::test]
    async fn test_stranger_cannot_comment_or_read() {
        let (service, ticket, creator, _) = setup().await;
        let comment = service.create(&creator, request(ticket.id, "hi")).await.unwrap();

        let stranger = Identity::new(UserId::new(), Role::User);
        assert!(service
            .create(&stranger, request(ticket.id, "me too"))
            .await
            .unwrap_err()
            .is_access_denied());
        assert!(service.list(&stranger, &ticket.id).await.unwrap_err().is_access_denied());
        assert!(service.get(&stranger, &comment.id).await.unwrap_err().is_access_denied());
    }

    #[tokio::test]
    async fn test_validation_and_missing_ticket() {
        let (service, ticket, creator, _) = setup().await;
        assert!(matches!(
            service.create(&creator, request(ticket.id, "   ")).await,
            Err(CoreError::Validation { .. })
        ));
        assert!(service
            .create(&creator, request(TicketId::new(), "hello"))
            .await
            .unwrap_err()
            .is_not_found());
    }
}
