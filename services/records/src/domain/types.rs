use std::fmt;

use serde::Serialize;

/// Dashboard reports served under `/api/admin/reports`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    Biodiversity,
    Geographic,
    ThreatDistribution,
    UserActivity,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Biodiversity => "biodiversity statistics",
            Self::Geographic => "geographic statistics",
            Self::ThreatDistribution => "threat distribution",
            Self::UserActivity => "user activity statistics",
        })
    }
}

// ── Biodiversity ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BiodiversityReport {
    pub total_species: u64,
    pub by_environment: Vec<EnvironmentCount>,
    pub threat_summary: ThreatSummary,
    pub diversity_by_location: Vec<LocationDiversity>,
    pub size_maturity_stats: SizeMaturityStats,
    pub uses_distribution: Vec<UseCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentCount {
    pub environment: String,
    pub count: u64,
}

/// Active records per conventional threat label. Unlisted labels are not counted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatSummary {
    pub harmless: u64,
    pub potentially_harmless: u64,
    pub dangerous_if_provoked: u64,
    pub unpredictable: u64,
    pub frequently_dangerous: u64,
    pub extremely_dangerous: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationDiversity {
    pub location: String,
    pub species_count: u64,
}

/// Size statistics over records with a positive numeric `max`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeMaturityStats {
    pub avg_max_size: f64,
    pub min_max_size: f64,
    pub max_max_size: f64,
    /// `null` when sized records carry no numeric maturity.
    pub avg_maturity: Option<f64>,
}

impl SizeMaturityStats {
    /// Reported when no record has a usable size.
    pub fn empty() -> Self {
        Self {
            avg_max_size: 0.0,
            min_max_size: 0.0,
            max_max_size: 0.0,
            avg_maturity: Some(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UseCount {
    #[serde(rename = "use")]
    pub use_: String,
    pub count: u64,
}

// ── Geographic ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeographicReport {
    pub by_country: Vec<NamedCount>,
    pub by_municipality: Vec<NamedCount>,
    pub by_barangay: Vec<NamedCount>,
    /// Raw points for the map heat layer, as stored.
    pub location_data: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedCount {
    pub name: String,
    pub count: u64,
}

// ── Threat distribution ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreatDistribution {
    pub data: Vec<ThreatShare>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreatShare {
    pub threat: String,
    pub count: u64,
    /// Share of the total, two decimals, as text.
    pub percentage: String,
}

// ── User activity ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivityReport {
    pub top_contributors: Vec<Contributor>,
    pub timeline: Vec<TimelinePoint>,
    pub by_role: Vec<RoleCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contributor {
    /// `null` for records whose owner field is present but empty.
    pub user_id: Option<String>,
    pub user_name: String,
    pub role: String,
    pub records_created: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelinePoint {
    pub year: i32,
    pub month: u32,
    pub count: u64,
    /// `YYYY-MM`.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleCount {
    pub role: String,
    pub count: u64,
}
