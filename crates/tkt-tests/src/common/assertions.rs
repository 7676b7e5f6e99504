// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Custom Assertions

use std::collections::BTreeSet;

use axum::http::{header, StatusCode};

use tkt_core::{Ticket, TicketId};

use super::harness::TestResponse;

/// Asserts the status code, printing the body on failure.
#[track_caller]
pub fn assert_status(response: &TestResponse, expected: StatusCode) {
    assert_eq!(
        response.status, expected,
        "unexpected status, body: {}",
        response.body
    );
}

/// Asserts an error response's status and machine code.
#[track_caller]
pub fn assert_error(response: &TestResponse, status: StatusCode, code: &str) {
    assert_status(response, status);
    assert_eq!(response.error_code(), Some(code), "body: {}", response.body);
}

/// Asserts the response varies on the `Authorization` header.
#[track_caller]
pub fn assert_varies_on_authorization(response: &TestResponse) {
    let varies = response
        .headers
        .get_all(header::VARY)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|v| v.trim().eq_ignore_ascii_case("authorization"));
    assert!(varies, "missing Vary: Authorization in {:?}", response.headers);
}

/// Asserts a refresh cookie with the hardened attributes was set.
#[track_caller]
pub fn assert_refresh_cookie_set(response: &TestResponse, name: &str) {
    let cookie = response.set_cookie().expect("Set-Cookie header");
    assert!(cookie.starts_with(&format!("{}=", name)), "cookie: {}", cookie);
    assert!(!cookie.starts_with(&format!("{}=;", name)), "cookie is empty: {}", cookie);
    for attribute in ["HttpOnly", "Secure", "SameSite=Strict"] {
        assert!(cookie.contains(attribute), "cookie lacks {}: {}", attribute, cookie);
    }
}

/// Asserts the refresh cookie was cleared.
#[track_caller]
pub fn assert_refresh_cookie_cleared(response: &TestResponse, name: &str) {
    let cookie = response.set_cookie().expect("Set-Cookie header");
    assert!(cookie.starts_with(&format!("{}=;", name)), "cookie: {}", cookie);
    assert!(cookie.contains("Max-Age=0"), "cookie: {}", cookie);
}

/// Asserts a ticket list holds exactly `expected`, in any order.
#[track_caller]
pub fn assert_ticket_ids(tickets: &[Ticket], expected: &[TicketId]) {
    let actual: BTreeSet<_> = tickets.iter().map(|t| t.id.to_string()).collect();
    let expected: BTreeSet<_> = expected.iter().map(|id| id.to_string()).collect();
    assert_eq!(actual, expected);
}
