// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Role-based access policy.
//!
//! Pure decision functions over `(identity, ticket)`. The whole model is
//! one table:
//!
//! | Action            | Admin  | Agent       | User       |
//! |-------------------|--------|-------------|------------|
//! | view              | always | if assigned | if creator |
//! | update content    | always | if assigned | if creator |
//! | update state      | always | if assigned | never      |
//! | update priority   | always | never       | never      |
//! | assign            | always | never       | never      |
//! | delete            | always | never       | never      |
//! | comment           | always | if assigned | if creator |
//! | manage users      | always | never       | never      |
//!
//! [`Role::Unknown`] is denied everything. Functions here never log and
//! never touch storage.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;
use crate::ticket::{Ticket, TicketField};
use crate::types::{Identity, Role, UserId};

// =============================================================================
// TicketAction
// =============================================================================

/// An operation on a single ticket that the policy gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketAction {
    /// Read the ticket.
    View,
    /// Change title or description.
    UpdateContent,
    /// Change the lifecycle state.
    UpdateState,
    /// Change the priority.
    UpdatePriority,
    /// Change the assignee set.
    Assign,
    /// Remove the ticket.
    Delete,
    /// Post a comment.
    Comment,
}

impl TicketAction {
    /// Returns the action name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketAction::View => "ticket:view",
            TicketAction::UpdateContent => "ticket:update",
            TicketAction::UpdateState => "ticket:state",
            TicketAction::UpdatePriority => "ticket:priority",
            TicketAction::Assign => "ticket:assign",
            TicketAction::Delete => "ticket:delete",
            TicketAction::Comment => "ticket:comment",
        }
    }

    /// Returns every action.
    pub fn all() -> &'static [TicketAction] {
        &[
            TicketAction::View,
            TicketAction::UpdateContent,
            TicketAction::UpdateState,
            TicketAction::UpdatePriority,
            TicketAction::Assign,
            TicketAction::Delete,
            TicketAction::Comment,
        ]
    }

    /// Returns the action that guards a change to `field`.
    pub fn for_field(field: TicketField) -> Self {
        match field {
            TicketField::Title | TicketField::Description => TicketAction::UpdateContent,
            TicketField::State => TicketAction::UpdateState,
            TicketField::Priority => TicketAction::UpdatePriority,
            TicketField::AssignedTo => TicketAction::Assign,
        }
    }

    /// Whether an assigned agent may perform this action.
    fn agent_may(&self) -> bool {
        matches!(
            self,
            TicketAction::View
                | TicketAction::UpdateContent
                | TicketAction::UpdateState
                | TicketAction::Comment
        )
    }

    /// Whether the creating user may perform this action.
    fn creator_may(&self) -> bool {
        matches!(
            self,
            TicketAction::View | TicketAction::UpdateContent | TicketAction::Comment
        )
    }
}

impl fmt::Display for TicketAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Decisions
// =============================================================================

/// Returns `true` if `identity` may perform `action` on `ticket`.
pub fn permits(identity: &Identity, action: TicketAction, ticket: &Ticket) -> bool {
    match identity.role {
        Role::Admin => true,
        Role::Agent => action.agent_may() && ticket.is_assignee(&identity.subject),
        Role::User => action.creator_may() && ticket.is_creator(&identity.subject),
        Role::Unknown => false,
    }
}

/// Checks `action`, failing with [`CoreError::AccessDenied`].
pub fn authorize(identity: &Identity, action: TicketAction, ticket: &Ticket) -> Result<(), CoreError> {
    if permits(identity, action, ticket) {
        Ok(())
    } else {
        Err(CoreError::AccessDenied)
    }
}

/// Checks every changed field. Any single denial rejects the whole update.
pub fn authorize_fields<'a>(
    identity: &Identity,
    ticket: &Ticket,
    fields: impl IntoIterator<Item = &'a TicketField>,
) -> Result<(), CoreError> {
    for field in fields {
        authorize(identity, TicketAction::for_field(*field), ticket)?;
    }
    Ok(())
}

/// Returns `true` if `identity` may view `ticket`.
#[inline]
pub fn can_view_ticket(identity: &Identity, ticket: &Ticket) -> bool {
    permits(identity, TicketAction::View, ticket)
}

/// Returns `true` if `identity` may edit `ticket` at all.
#[inline]
pub fn can_update_ticket(identity: &Identity, ticket: &Ticket) -> bool {
    permits(identity, TicketAction::UpdateContent, ticket)
}

/// Returns `true` if `identity` may change the state of `ticket`.
#[inline]
pub fn can_update_state(identity: &Identity, ticket: &Ticket) -> bool {
    permits(identity, TicketAction::UpdateState, ticket)
}

/// Returns `true` if `identity` may change the priority of `ticket`.
#[inline]
pub fn can_update_priority(identity: &Identity, ticket: &Ticket) -> bool {
    permits(identity, TicketAction::UpdatePriority, ticket)
}

/// Returns `true` if `identity` may change the assignees of `ticket`.
#[inline]
pub fn can_assign_ticket(identity: &Identity, ticket: &Ticket) -> bool {
    permits(identity, TicketAction::Assign, ticket)
}

/// Returns `true` if `identity` may delete `ticket`.
#[inline]
pub fn can_delete_ticket(identity: &Identity, ticket: &Ticket) -> bool {
    permits(identity, TicketAction::Delete, ticket)
}

/// Returns `true` if `identity` may comment on `ticket`.
#[inline]
pub fn can_comment_ticket(identity: &Identity, ticket: &Ticket) -> bool {
    permits(identity, TicketAction::Comment, ticket)
}

/// Returns `true` if `identity` may list, edit and delete accounts.
#[inline]
pub fn can_manage_users(identity: &Identity) -> bool {
    identity.role == Role::Admin
}

/// Checks account management rights.
pub fn authorize_user_management(identity: &Identity) -> Result<(), CoreError> {
    if can_manage_users(identity) {
        Ok(())
    } else {
        Err(CoreError::AccessDenied)
    }
}

// =============================================================================
// Listing
// =============================================================================

/// Which tickets a listing may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    /// Every ticket.
    All,
    /// Tickets opened by the given account.
    CreatedBy(UserId),
    /// Tickets assigned to the given account.
    AssignedTo(UserId),
}

/// Resolves what an unqualified "list tickets" returns for `identity`.
pub fn list_scope(identity: &Identity) -> Result<ListScope, CoreError> {
    match identity.role {
        Role::Admin => Ok(ListScope::All),
        Role::Agent => Ok(ListScope::AssignedTo(identity.subject)),
        Role::User => Ok(ListScope::CreatedBy(identity.subject)),
        Role::Unknown => Err(CoreError::AccessDenied),
    }
}

/// Returns `true` if `identity` may list tickets tied to `owner`.
pub fn can_list_for(identity: &Identity, owner: &UserId) -> bool {
    match identity.role {
        Role::Admin => true,
        Role::Agent | Role::User => identity.is(owner),
        Role::Unknown => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (Identity, Identity, Identity, Identity, Ticket) {
        let user = Identity::new(UserId::new(), Role::User);
        let agent = Identity::new(UserId::new(), Role::Agent);
        let admin = Identity::new(UserId::new(), Role::Admin);
        let stranger = Identity::new(UserId::new(), Role::Unknown);
        let mut ticket = Ticket::open(user.subject, "VPN down", "");
        ticket.assigned_to.insert(agent.subject);
        (user, agent, admin, stranger, ticket)
    }

    #[test]
    fn test_admin_allowed_everything() {
        let (_, _, admin, _, ticket) = fixture();
        for action in TicketAction::all() {
            assert!(permits(&admin, *action, &ticket), "{action}");
        }
        assert!(can_manage_users(&admin));
    }

    #[test]
    fn test_unknown_role_denied_everything() {
        let (_, _, _, mut stranger, ticket) = fixture();
        stranger.subject = ticket.created_by;
        for action in TicketAction::all() {
            assert!(!permits(&stranger, *action, &ticket), "{action}");
        }
        assert!(!can_manage_users(&stranger));
        assert!(list_scope(&stranger).is_err());
        assert!(!can_list_for(&stranger, &stranger.subject));
    }

    #[test]
    fn test_creator_rights() {
        let (user, _, _, _, ticket) = fixture();
        assert!(can_view_ticket(&user, &ticket));
        assert!(can_update_ticket(&user, &ticket));
        assert!(can_comment_ticket(&user, &ticket));
        assert!(!can_update_state(&user, &ticket));
        assert!(!can_update_priority(&user, &ticket));
        assert!(!can_assign_ticket(&user, &ticket));
        assert!(!can_delete_ticket(&user, &ticket));

        let other = Identity::new(UserId::new(), Role::User);
        assert!(!can_view_ticket(&other, &ticket));
        assert!(!can_comment_ticket(&other, &ticket));
    }

    #[test]
    fn test_assignee_rights() {
        let (_, agent, _, _, ticket) = fixture();
        assert!(can_view_ticket(&agent, &ticket));
        assert!(can_update_ticket(&agent, &ticket));
        assert!(can_update_state(&agent, &ticket));
        assert!(can_comment_ticket(&agent, &ticket));
        assert!(!can_update_priority(&agent, &ticket));
        assert!(!can_assign_ticket(&agent, &ticket));
        assert!(!can_delete_ticket(&agent, &ticket));

        let unassigned = Identity::new(UserId::new(), Role::Agent);
        assert!(!can_view_ticket(&unassigned, &ticket));
        assert!(!can_update_state(&unassigned, &ticket));
    }

    #[test]
    fn test_agent_who_created_ticket_is_not_creator_privileged() {
        let agent = Identity::new(UserId::new(), Role::Agent);
        let ticket = Ticket::open(agent.subject, "self-filed", "");
        assert!(!can_view_ticket(&agent, &ticket));
    }

    #[test]
    fn test_field_authorization_rejects_whole_update() {
        let (user, agent, _, _, ticket) = fixture();
        let fields = [TicketField::Title, TicketField::Priority];
        assert!(matches!(
            authorize_fields(&user, &ticket, &fields),
            Err(CoreError::AccessDenied)
        ));
        assert!(authorize_fields(&agent, &ticket, &[TicketField::State, TicketField::Title]).is_ok());
        assert!(authorize_fields(&agent, &ticket, &[TicketField::AssignedTo]).is_err());
    }

    #[test]
    fn test_list_scope() {
        let (user, agent, admin, _, _) = fixture();
        assert_eq!(list_scope(&admin).unwrap(), ListScope::All);
        assert_eq!(list_scope(&user).unwrap(), ListScope::CreatedBy(user.subject));
        assert_eq!(list_scope(&agent).unwrap(), ListScope::AssignedTo(agent.subject));

        assert!(can_list_for(&admin, &user.subject));
        assert!(can_list_for(&user, &user.subject));
        assert!(!can_list_for(&user, &agent.subject));
    }
}
