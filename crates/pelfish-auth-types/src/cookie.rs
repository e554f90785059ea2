//! Session cookie handling.
//!
//! The login token is issued by the accounts system; this side only reads it
//! and clears it on logout.

use axum_extra::extract::cookie::{Cookie, CookieJar};
use time::Duration;

/// Cookie carrying the opaque login token.
pub const SESSION_COOKIE: &str = "meteor_login_token";

/// Token presented in the session cookie, if any. Empty values count as absent.
pub fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
}

/// Expire the session cookie.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use pelfish_auth_types::cookie::{clear_session_cookie, SESSION_COOKIE};
///
/// let jar = clear_session_cookie(CookieJar::new());
/// let cookie = jar.get(SESSION_COOKIE).unwrap();
/// assert_eq!(cookie.value(), "");
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
/// assert!(cookie.http_only().unwrap_or(false));
/// ```
pub fn clear_session_cookie(jar: CookieJar) -> CookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(Duration::ZERO)
        .http_only(true)
        .build();
    jar.add(cookie)
}
