/// Request gate primitives
///
/// The API server runs a single gate in front of every route. This module
/// holds the parts of that gate that do not depend on server state:
///
/// - [`classify_path`] decides whether a path is public, bypasses the gate,
///   is a protected page, or is a protected API endpoint
/// - [`session_token_from_headers`] pulls the session token out of a bearer
///   header or the session cookie
/// - [`login_redirect_target`] builds the login URL that preserves the
///   original destination
/// - [`SessionContext`] is what the gate inserts into request extensions
///
/// # Example
///
/// ```
/// use pagepilot_shared::auth::gate::{classify_path, login_redirect_target, RouteClass};
///
/// assert_eq!(classify_path("/dashboard/settings"), RouteClass::Page);
/// assert_eq!(classify_path("/api/auth/login"), RouteClass::Bypass);
/// assert_eq!(
///     login_redirect_target("/dashboard?tab=posts"),
///     "/login?callbackUrl=%2Fdashboard%3Ftab%3Dposts"
/// );
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::session::{SessionClaims, SESSION_COOKIE};

/// Page prefix that requires a session
pub const PAGE_PREFIX: &str = "/dashboard";

/// Auth prefix handled by the auth endpoints themselves
pub const AUTH_PREFIX: &str = "/api/auth";

/// API prefix; everything under it is protected unless it bypasses
pub const API_PREFIX: &str = "/api";

/// Auth routes that still need a session
const AUTH_PROTECTED: [&str; 1] = ["/api/auth/me"];

/// Login page that unauthenticated page requests are sent to
pub const LOGIN_PATH: &str = "/login";

/// How the gate treats a request path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// No session needed; not inspected
    Public,

    /// Auth endpoints; passed through without inspection
    Bypass,

    /// Protected HTML page; redirect to login when unauthenticated
    Page,

    /// Protected API endpoint; 401 when unauthenticated
    Api,
}

/// Authenticated session attached to request extensions by the gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Authenticated user
    pub user_id: Uuid,

    /// Email from the session claims
    pub email: String,
}

impl From<SessionClaims> for SessionContext {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
        }
    }
}

/// Segment-aware prefix match: `/dashboard` matches `/dashboard/x` but not
/// `/dashboardx`
fn under(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Classifies a request path for the gate
pub fn classify_path(path: &str) -> RouteClass {
    if AUTH_PROTECTED.contains(&path) {
        return RouteClass::Api;
    }

    if under(path, AUTH_PREFIX) {
        return RouteClass::Bypass;
    }

    if under(path, PAGE_PREFIX) {
        return RouteClass::Page;
    }

    if under(path, API_PREFIX) {
        return RouteClass::Api;
    }

    RouteClass::Public
}

/// Extracts the session token, preferring a bearer header over the cookie
pub fn session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Login URL that returns the user to `original` after signing in
pub fn login_redirect_target(original: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(original.as_bytes()).collect();
    format!("{}?callbackUrl={}", LOGIN_PATH, encoded)
}

/// Sanitizes a `callbackUrl` so it can only point back into this site
///
/// Only a single-slash path made of printable ASCII is kept. Browsers drop
/// tabs and newlines from URLs, so `/\t/host` would otherwise become
/// `//host`; anything outside printable ASCII is also not a valid
/// `Location` header value.
pub fn safe_callback_path(candidate: Option<&str>) -> String {
    match candidate {
        Some(path) if is_local_path(path) => path.to_string(),
        _ => PAGE_PREFIX.to_string(),
    }
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && path.bytes().all(|b| b.is_ascii_graphic() && b != b'\\')
}
