//! Session helpers for request-level tests.
//!
//! Services resolve the caller from the login-token cookie; tests attach the
//! cookie directly and seed a matching user document.

use http::header::{COOKIE, HeaderName};
use http::HeaderValue;

use pelfish_auth_types::cookie::SESSION_COOKIE;

/// Login token used by fixtures when a test does not care about its value.
pub const TEST_LOGIN_TOKEN: &str = "test-login-token";

/// `Cookie` header carrying `token` as the session cookie.
pub fn session_cookie(token: &str) -> (HeaderName, HeaderValue) {
    let value = HeaderValue::from_str(&format!("{SESSION_COOKIE}={token}"))
        .unwrap_or_else(|e| panic!("invalid session token {token:?}: {e}"));
    (COOKIE, value)
}
