use std::future::Future;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use serde::Serialize;

use pelfish_auth_types::cookie::{clear_session_cookie, session_token};
use pelfish_auth_types::identity::{Identity, Session};
use pelfish_core::store::DocumentStore;

use crate::error::RecordsServiceError;
use crate::state::AppState;
use crate::usecase::session::{AuthenticateUseCase, require_identity};

// ── Extractors ───────────────────────────────────────────────────────────────

/// Session resolved from the login cookie. Anonymous when absent or unknown.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

impl<S> FromRequestParts<AppState<S>> for CurrentSession
where
    S: DocumentStore + Clone + 'static,
{
    type Rejection = std::convert::Infallible;

    // Read the cookie synchronously and hand back a 'static future that owns
    // the repository.
    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = session_token(&CookieJar::from_headers(&parts.headers));
        let usecase = AuthenticateUseCase {
            users: state.user_repo(),
        };
        async move { Ok(Self(usecase.execute(token.as_deref()).await)) }
    }
}

/// Identity of a signed-in user; rejects anonymous requests with 401.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

impl<S> FromRequestParts<AppState<S>> for AuthenticatedUser
where
    S: DocumentStore + Clone + 'static,
{
    type Rejection = RecordsServiceError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = session_token(&CookieJar::from_headers(&parts.headers));
        let usecase = AuthenticateUseCase {
            users: state.user_repo(),
        };
        async move {
            let session = usecase.execute(token.as_deref()).await;
            require_identity(session).map(Self)
        }
    }
}

// ── GET /api/session ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SessionResponse {
    pub user: Option<Identity>,
}

pub async fn get_session(CurrentSession(session): CurrentSession) -> Json<SessionResponse> {
    Json(SessionResponse {
        user: session.into_identity(),
    })
}

// ── POST /auth/logout ────────────────────────────────────────────────────────

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (StatusCode::NO_CONTENT, clear_session_cookie(jar))
}
