use bson::{Bson, Document};
use serde::{Deserialize, Deserializer};

use pelfish_domain::user::UserProfile;

pub const COLLECTION: &str = "users";

pub const ID: &str = "_id";
pub const PROFILE: &str = "profile";
pub const PROFILE_DISPLAY_NAME: &str = "profile.displayName";
pub const PROFILE_FIRST_NAME: &str = "profile.firstName";
pub const PROFILE_LAST_NAME: &str = "profile.lastName";
pub const EMAILS: &str = "emails";
pub const ROLE: &str = "role";
/// Resume tokens the accounts system keeps per user; matched exactly.
pub const SESSION_TOKEN: &str = "services.resume.loginTokens.hashedToken";

/// The subset of a user document the services read.
///
/// Accounts are written by several clients, so `profile` and `emails` are
/// read leniently: wrongly typed values decode as absent instead of failing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserDocument {
    #[serde(rename = "_id")]
    pub id: Bson,
    #[serde(default, deserialize_with = "lenient_profile")]
    pub profile: Option<UserProfile>,
    #[serde(default, deserialize_with = "lenient_emails")]
    pub emails: Vec<EmailEntry>,
    #[serde(default)]
    pub role: Option<Bson>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailEntry {
    pub address: Option<String>,
}

impl UserDocument {
    pub fn primary_email(&self) -> Option<&str> {
        self.emails.first().and_then(|e| e.address.as_deref())
    }

    /// Role as text; non-string roles are treated as absent.
    pub fn role(&self) -> Option<&str> {
        match &self.role {
            Some(Bson::String(role)) => Some(role),
            _ => None,
        }
    }
}

fn text(doc: &Document, key: &str) -> Option<String> {
    match doc.get(key) {
        Some(Bson::String(s)) => Some(s.clone()),
        _ => None,
    }
}

fn lenient_profile<'de, D: Deserializer<'de>>(d: D) -> Result<Option<UserProfile>, D::Error> {
    Ok(match Option::<Bson>::deserialize(d)? {
        Some(Bson::Document(profile)) => Some(UserProfile {
            display_name: text(&profile, "displayName"),
            first_name: text(&profile, "firstName"),
            last_name: text(&profile, "lastName"),
        }),
        _ => None,
    })
}

fn lenient_emails<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<EmailEntry>, D::Error> {
    Ok(match Option::<Bson>::deserialize(d)? {
        Some(Bson::Array(entries)) => entries
            .iter()
            .map(|entry| EmailEntry {
                address: entry.as_document().and_then(|e| text(e, "address")),
            })
            .collect(),
        _ => Vec::new(),
    })
}
