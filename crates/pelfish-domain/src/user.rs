//! User domain types.

use serde::Serialize;

/// Display name used when a user has no usable name data.
pub const UNKNOWN_USER: &str = "Unknown User";

/// Role label for contributors whose role is absent (top-contributors report).
pub const CONTRIBUTOR_ROLE_FALLBACK: &str = "unknown";

/// Role label for the per-role breakdown when the owner has no role.
///
/// Intentionally differs in case from [`CONTRIBUTOR_ROLE_FALLBACK`]; the two
/// reports have always labelled the gap differently and dashboards key on it.
pub const ROLE_BREAKDOWN_FALLBACK: &str = "Unknown";

/// Profile sub-document of a user account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl UserProfile {
    /// Resolve the name shown for this profile.
    ///
    /// `displayName` wins; otherwise `"first last"` trimmed; otherwise
    /// [`UNKNOWN_USER`]. Empty strings count as absent.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.display_name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_owned();
        }
        let full = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let full = full.trim();
        if full.is_empty() {
            UNKNOWN_USER.to_owned()
        } else {
            full.to_owned()
        }
    }
}

/// Name for an optional profile; a missing profile resolves to [`UNKNOWN_USER`].
pub fn resolve_display_name(profile: Option<&UserProfile>) -> String {
    profile.map_or_else(|| UNKNOWN_USER.to_owned(), UserProfile::display_name)
}

/// Role label with an explicit fallback for absent or empty roles.
pub fn role_label<'a>(role: Option<&'a str>, fallback: &'a str) -> &'a str {
    match role {
        Some(r) if !r.is_empty() => r,
        _ => fallback,
    }
}
