//! Document builders for seeding a [`MemoryStore`](crate::store::MemoryStore).
//!
//! Field names are spelled out literally so fixtures also catch typos in the
//! services' schema constants.

use bson::{Bson, Document, doc};
use chrono::{DateTime, Utc};

/// Builder for a `records` document. Starts active with only `_id` set.
///
/// ```
/// use pelfish_testing::fixture::RecordFixture;
/// let d = RecordFixture::new("r1").threat("Harmless").max(12.5).build();
/// assert_eq!(d.get_str("threat").unwrap(), "Harmless");
/// assert!(d.get_bool("isActive").unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct RecordFixture {
    doc: Document,
}

impl RecordFixture {
    pub fn new(id: &str) -> Self {
        Self {
            doc: doc! { "_id": id, "isActive": true },
        }
    }

    /// Set an arbitrary field, overwriting any previous value.
    pub fn set(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.doc.insert(field, value.into());
        self
    }

    pub fn name(self, name: &str) -> Self {
        self.set("name", name)
    }

    pub fn threat(self, threat: &str) -> Self {
        self.set("threat", threat)
    }

    pub fn environment(self, environment: &str) -> Self {
        self.set("environment", environment)
    }

    pub fn uses(self, uses: &str) -> Self {
        self.set("uses", uses)
    }

    pub fn country(self, country: &str) -> Self {
        self.set("country", country)
    }

    pub fn municipality(self, municipality: &str) -> Self {
        self.set("municipality", municipality)
    }

    pub fn barangay(self, barangay: &str) -> Self {
        self.set("barangay", barangay)
    }

    pub fn max(self, max: f64) -> Self {
        self.set("max", max)
    }

    pub fn maturity(self, maturity: f64) -> Self {
        self.set("maturity", maturity)
    }

    pub fn location(self, latitude: f64, longitude: f64) -> Self {
        self.set("latitude", latitude).set("longitude", longitude)
    }

    pub fn markers(self, markers: &[[f64; 2]]) -> Self {
        let markers: Vec<Bson> = markers
            .iter()
            .map(|[lat, lng]| Bson::Array(vec![Bson::Double(*lat), Bson::Double(*lng)]))
            .collect();
        self.set("markers", markers)
    }

    pub fn image(self, image: &str) -> Self {
        self.set("image", image)
    }

    /// Stamp `created` and `createdAt` with the same instant.
    pub fn created(self, at: DateTime<Utc>) -> Self {
        let at = bson::DateTime::from_chrono(at);
        self.set("created", at).set("createdAt", at)
    }

    pub fn created_by(self, user_id: &str) -> Self {
        self.set("createdBy", user_id)
    }

    pub fn inactive(self) -> Self {
        self.set("isActive", false)
    }

    /// Drop `isActive` entirely, as in documents written before the field existed.
    pub fn legacy(mut self) -> Self {
        self.doc.remove("isActive");
        self
    }

    pub fn build(self) -> Document {
        self.doc
    }
}

/// Builder for a `users` document.
#[derive(Debug, Clone)]
pub struct UserFixture {
    doc: Document,
}

impl UserFixture {
    pub fn new(id: &str) -> Self {
        Self {
            doc: doc! { "_id": id },
        }
    }

    fn profile_mut(&mut self) -> &mut Document {
        if !matches!(self.doc.get("profile"), Some(Bson::Document(_))) {
            self.doc.insert("profile", Document::new());
        }
        match self.doc.get_mut("profile") {
            Some(Bson::Document(profile)) => profile,
            _ => unreachable!("profile was just inserted"),
        }
    }

    pub fn display_name(mut self, name: &str) -> Self {
        self.profile_mut().insert("displayName", name);
        self
    }

    pub fn names(mut self, first: &str, last: &str) -> Self {
        let profile = self.profile_mut();
        profile.insert("firstName", first);
        profile.insert("lastName", last);
        self
    }

    pub fn email(mut self, address: &str) -> Self {
        self.doc
            .insert("emails", vec![Bson::Document(doc! { "address": address, "verified": true })]);
        self
    }

    pub fn role(mut self, role: &str) -> Self {
        self.doc.insert("role", role);
        self
    }

    /// Attach a resume login token matching a session cookie value.
    pub fn login_token(mut self, token: &str) -> Self {
        self.doc.insert(
            "services",
            doc! { "resume": { "loginTokens": [ { "hashedToken": token } ] } },
        );
        self
    }

    pub fn build(self) -> Document {
        self.doc
    }
}
