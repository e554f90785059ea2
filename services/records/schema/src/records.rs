use serde::{Deserialize, Serialize};

use pelfish_core::store::Filter;
use pelfish_domain::id::{RecordId, UserId};

pub const COLLECTION: &str = "records";

pub const ID: &str = "_id";
pub const NAME: &str = "name";
pub const DESCRIPTION: &str = "description";
pub const IMAGE: &str = "image";
pub const ENVIRONMENT: &str = "environment";
pub const THREAT: &str = "threat";
pub const USES: &str = "uses";
pub const MAX: &str = "max";
pub const MATURITY: &str = "maturity";
pub const COUNTRY: &str = "country";
pub const MUNICIPALITY: &str = "municipality";
pub const BARANGAY: &str = "barangay";
pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const MARKERS: &str = "markers";
pub const CREATED: &str = "created";
pub const CREATED_AT: &str = "createdAt";
pub const CREATED_BY: &str = "createdBy";
pub const UPDATED_AT: &str = "updatedAt";
pub const UPDATED_BY: &str = "updatedBy";
/// Soft-delete flag. Every record written by the service carries it.
pub const IS_ACTIVE: &str = "isActive";

/// Records visible to listings and reports.
pub fn active() -> Filter {
    Filter::eq(IS_ACTIVE, true)
}

/// Legacy records written before the soft-delete flag existed.
///
/// Distinct from inactive records: `isActive: false` is never matched.
pub fn missing_active() -> Filter {
    Filter::missing(IS_ACTIVE)
}

/// Marker coordinate as `[latitude, longitude]`.
pub type Marker = [f64; 2];

/// Record content accepted by the bulk import.
///
/// Identity and lifecycle fields are not part of the payload; they are stamped
/// by the service when the record is created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biology: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub municipality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barangay: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maturity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markers: Option<Vec<Marker>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// A record as first written to the collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRecordDocument {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: RecordFields,
    pub created: bson::DateTime,
    #[serde(rename = "createdAt")]
    pub created_at: bson::DateTime,
    #[serde(rename = "createdBy")]
    pub created_by: UserId,
    #[serde(rename = "isActive")]
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_filters_render_as_expected() {
        assert_eq!(active().to_document(), bson::doc! { "isActive": true });
        assert_eq!(
            missing_active().to_document(),
            bson::doc! { "isActive": { "$exists": false } }
        );
    }

    #[test]
    fn import_ignores_lifecycle_fields() {
        let fields: RecordFields = serde_json::from_value(serde_json::json!({
            "_id": "client-chosen",
            "isActive": false,
            "name": "Tilapia",
            "markers": [[14.6, 121.0]],
        }))
        .unwrap();
        assert_eq!(fields.name.as_deref(), Some("Tilapia"));
        assert_eq!(fields.markers, Some(vec![[14.6, 121.0]]));
        let back = serde_json::to_value(&fields).unwrap();
        assert!(back.get("_id").is_none());
        assert!(back.get("isActive").is_none());
    }
}
