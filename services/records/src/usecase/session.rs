use tracing::warn;

use pelfish_auth_types::identity::{Identity, Session};
use pelfish_core::bson_ext::id_string;
use pelfish_domain::id::UserId;
use pelfish_domain::user::resolve_display_name;
use pelfish_records_schema::users::UserDocument;

use crate::domain::repository::UserRepository;
use crate::error::RecordsServiceError;

// ── Authenticate ─────────────────────────────────────────────────────────────

/// Resolve a session token to the user behind it.
///
/// Never fails: unknown tokens and store failures both yield an anonymous
/// session, so gated routes answer 401 and open routes keep working.
pub struct AuthenticateUseCase<R: UserRepository> {
    pub users: R,
}

impl<R: UserRepository> AuthenticateUseCase<R> {
    pub async fn execute(&self, token: Option<&str>) -> Session {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Session::Anonymous;
        };
        match self.users.find_by_session_token(token).await {
            Ok(Some(user)) => identity_from(user).map_or(Session::Anonymous, Session::Authenticated),
            Ok(None) => Session::Anonymous,
            Err(e) => {
                warn!(error = ?e, "session lookup failed, continuing anonymously");
                Session::Anonymous
            }
        }
    }
}

fn identity_from(user: UserDocument) -> Option<Identity> {
    let id = id_string(&user.id)?;
    let email = user.primary_email().map(str::to_owned);
    Some(Identity {
        id: UserId::new(id),
        name: resolve_display_name(user.profile.as_ref()),
        email,
        profile: user.profile,
    })
}

/// Gate for mutations and reports.
pub fn require_identity(session: Session) -> Result<Identity, RecordsServiceError> {
    session
        .into_identity()
        .ok_or(RecordsServiceError::Unauthorized)
}
