//! Resolved session identity.

use serde::Serialize;

use pelfish_domain::id::UserId;
use pelfish_domain::user::UserProfile;

/// The user behind a valid session token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identity {
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Display name, already resolved through the profile fallback chain.
    pub name: String,
    pub email: Option<String>,
    pub profile: Option<UserProfile>,
}

/// Outcome of resolving a session token.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(Identity),
}

impl Session {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(identity) => Some(identity),
        }
    }

    pub fn into_identity(self) -> Option<Identity> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(identity) => Some(identity),
        }
    }
}
