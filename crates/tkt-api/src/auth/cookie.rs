// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Refresh-token cookie policy.
//!
//! The refresh token never appears in a response body. It is set as an
//! `HttpOnly; Secure; SameSite=Strict` cookie scoped to the configured
//! path and domain, and cleared with `Max-Age=0` plus an epoch `Expires`.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// `Expires` value that every user agent treats as already past.
const EPOCH_HTTP_DATE: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Refresh cookie configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieConfig {
    /// Cookie name.
    pub name: String,
    /// `Path` attribute.
    pub path: String,
    /// `Domain` attribute. Omitted when empty.
    pub domain: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "tapp-refresh_token".to_string(),
            path: "/".to_string(),
            domain: "localhost".to_string(),
        }
    }
}

/// Renders and reads the refresh cookie.
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    config: CookieConfig,
    max_age_secs: i64,
}

impl CookiePolicy {
    /// Creates a policy whose cookies live for `max_age_secs`.
    pub fn new(config: CookieConfig, max_age_secs: i64) -> Self {
        Self {
            config,
            max_age_secs,
        }
    }

    /// Returns the cookie name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the `Set-Cookie` value carrying `token`.
    ///
    /// A lifetime past the representable range saturates `Expires`.
    pub fn issue(&self, token: &str) -> String {
        let expires = Duration::try_seconds(self.max_age_secs)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
            .format("%a, %d %b %Y %H:%M:%S GMT")
            .to_string();
        self.render(token, self.max_age_secs, &expires)
    }

    /// Returns the `Set-Cookie` value that expires the cookie immediately.
    pub fn expire(&self) -> String {
        self.render("", 0, EPOCH_HTTP_DATE)
    }

    /// Reads the refresh token from the request's `Cookie` headers.
    pub fn read(&self, headers: &HeaderMap) -> Option<String> {
        parse_cookie(headers, &self.config.name)
    }

    fn render(&self, value: &str, max_age: i64, expires: &str) -> String {
        let mut cookie = format!(
            "{}={}; Path={}",
            self.config.name, value, self.config.path
        );
        if !self.config.domain.is_empty() {
            cookie.push_str("; Domain=");
            cookie.push_str(&self.config.domain);
        }
        cookie.push_str(&format!(
            "; Max-Age={max_age}; Expires={expires}; HttpOnly; Secure; SameSite=Strict"
        ));
        cookie
    }
}

/// Finds cookie `name` across every `Cookie` header. Empty values count as absent.
pub fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|s| s.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
