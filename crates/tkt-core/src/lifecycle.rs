// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Ticket state machine.
//!
//! Validates status transitions independently of who requests them:
//!
//! ```text
//! Open      -> Pending | Cancelled
//! Pending   -> Open | Resolved | Cancelled
//! Resolved  -> Open | Pending | Closed | Cancelled
//! Closed    -> (terminal)
//! Cancelled -> (terminal)
//! ```
//!
//! Every state may "transition" to itself, so resubmitting an unchanged
//! state is never an error.

use crate::error::CoreError;
use crate::ticket::TicketState;

/// Returns the states reachable from `from`, excluding `from` itself.
pub fn allowed_transitions(from: TicketState) -> &'static [TicketState] {
    use TicketState::*;
    match from {
        Open => &[Pending, Cancelled],
        Pending => &[Open, Resolved, Cancelled],
        Resolved => &[Open, Pending, Closed, Cancelled],
        Closed | Cancelled => &[],
    }
}

/// Returns `true` if a ticket in `from` may move to `to`.
#[inline]
pub fn can_transition(from: TicketState, to: TicketState) -> bool {
    from == to || allowed_transitions(from).contains(&to)
}

/// Returns `true` if `state` has no outgoing transitions.
#[inline]
pub fn is_terminal(state: TicketState) -> bool {
    allowed_transitions(state).is_empty()
}

/// Returns the current state followed by every state reachable from it.
pub fn valid_transitions(from: TicketState) -> Vec<TicketState> {
    let mut states = Vec::with_capacity(allowed_transitions(from).len() + 1);
    states.push(from);
    states.extend_from_slice(allowed_transitions(from));
    states
}

/// Checks a transition, failing with [`CoreError::InvalidTransition`].
pub fn ensure_transition(from: TicketState, to: TicketState) -> Result<(), CoreError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TicketState::*;

    #[test]
    fn test_reflexive_transitions() {
        for state in TicketState::ALL {
            assert!(can_transition(state, state), "{state} -> {state}");
            assert!(ensure_transition(state, state).is_ok());
        }
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for terminal in [Closed, Cancelled] {
            assert!(is_terminal(terminal));
            for to in TicketState::ALL {
                if to != terminal {
                    assert!(!can_transition(terminal, to), "{terminal} -> {to}");
                }
            }
        }
        assert!(!is_terminal(Open));
        assert!(!is_terminal(Resolved));
    }

    #[test]
    fn test_allow_list() {
        assert!(can_transition(Open, Pending));
        assert!(can_transition(Open, Cancelled));
        assert!(!can_transition(Open, Resolved));
        assert!(!can_transition(Open, Closed));

        assert!(can_transition(Pending, Open));
        assert!(can_transition(Pending, Resolved));
        assert!(!can_transition(Pending, Closed));

        assert!(can_transition(Resolved, Closed));
        assert!(can_transition(Resolved, Open));
        assert!(can_transition(Resolved, Pending));
    }

    #[test]
    fn test_valid_transitions_starts_with_current() {
        assert_eq!(valid_transitions(Open), vec![Open, Pending, Cancelled]);
        assert_eq!(valid_transitions(Closed), vec![Closed]);
        assert_eq!(
            valid_transitions(Resolved),
            vec![Resolved, Open, Pending, Closed, Cancelled]
        );
    }

    #[test]
    fn test_ensure_transition_error() {
        let err = ensure_transition(Closed, Open).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidTransition { from: Closed, to: Open }
        ));
        assert_eq!(
            err.to_string(),
            "cannot transition ticket from closed to open"
        );
    }
}
