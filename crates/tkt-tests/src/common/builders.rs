// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Builders
//!
//! Builders for tickets inserted straight into a store and for HTTP
//! requests sent through the router.

use std::collections::BTreeSet;

use axum::body::Body;
use axum::http::{header, Method, Request};
use serde_json::Value;

use tkt_core::{Ticket, TicketPriority, TicketState, UserId};

// =============================================================================
// TicketBuilder
// =============================================================================

/// Builds a [`Ticket`] in any shape, bypassing the service rules.
#[derive(Debug, Clone)]
pub struct TicketBuilder {
    ticket: Ticket,
}

impl TicketBuilder {
    /// Starts from a fresh `Open`/`Low` ticket opened by `creator`.
    pub fn new(creator: UserId) -> Self {
        Self {
            ticket: Ticket::open(creator, "Printer on fire", "Third floor, again."),
        }
    }

    /// Sets the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.ticket.title = title.into();
        self
    }

    /// Sets the state.
    pub fn state(mut self, state: TicketState) -> Self {
        self.ticket.state = state;
        self
    }

    /// Sets the priority.
    pub fn priority(mut self, priority: TicketPriority) -> Self {
        self.ticket.priority = priority;
        self
    }

    /// Adds an assignee.
    pub fn assignee(mut self, agent: UserId) -> Self {
        self.ticket.assigned_to.insert(agent);
        self
    }

    /// Replaces the assignee set.
    pub fn assignees(mut self, agents: impl IntoIterator<Item = UserId>) -> Self {
        self.ticket.assigned_to = agents.into_iter().collect::<BTreeSet<_>>();
        self
    }

    /// Builds the ticket.
    pub fn build(self) -> Ticket {
        self.ticket
    }
}

// =============================================================================
// RequestBuilder
// =============================================================================

/// Builds HTTP requests for `oneshot` calls.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    uri: String,
    bearer: Option<String>,
    cookie: Option<String>,
    body: Option<Value>,
    raw_body: Option<String>,
}

impl RequestBuilder {
    /// Starts a request.
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            bearer: None,
            cookie: None,
            body: None,
            raw_body: None,
        }
    }

    /// Shorthand for a GET request.
    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(Method::GET, uri)
    }

    /// Shorthand for a POST request.
    pub fn post(uri: impl Into<String>) -> Self {
        Self::new(Method::POST, uri)
    }

    /// Sets the bearer token.
    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Sets the `Cookie` header.
    pub fn cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    /// Sets a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets a body sent verbatim with a JSON content type.
    pub fn raw_json(mut self, body: impl Into<String>) -> Self {
        self.raw_body = Some(body.into());
        self
    }

    /// Builds the request.
    pub fn build(self) -> Request<Body> {
        let mut builder = Request::builder().method(self.method).uri(self.uri);
        if let Some(token) = self.bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(cookie) = self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let body = match (self.body, self.raw_body) {
            (Some(json), _) => Some(json.to_string()),
            (None, raw) => raw,
        };
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .expect("valid request"),
            None => builder.body(Body::empty()).expect("valid request"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_builder() {
        let creator = UserId::new();
        let agent = UserId::new();
        let ticket = TicketBuilder::new(creator)
            .state(TicketState::Pending)
            .priority(TicketPriority::High)
            .assignee(agent)
            .build();

        assert_eq!(ticket.created_by, creator);
        assert!(ticket.is_assignee(&agent));
        assert_eq!(ticket.state, TicketState::Pending);
    }

    #[test]
    fn test_request_builder_headers() {
        let request = RequestBuilder::post("/api/v1/ticket")
            .bearer("abc")
            .json(serde_json::json!({ "title": "t" }))
            .build();

        assert_eq!(request.headers()[header::AUTHORIZATION], "Bearer abc");
        assert_eq!(request.headers()[header::CONTENT_TYPE], "application/json");
    }
}
