//! Threat classification of a species.

/// Label used when a record carries no threat classification.
pub const UNKNOWN_THREAT: &str = "Unknown";

/// Conventional threat categories.
///
/// The stored value is free text; these are the labels the catalog uses by
/// convention. Anything else is reported verbatim by the distribution report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreatLevel {
    Harmless,
    PotentiallyHarmless,
    DangerousIfProvoked,
    Unpredictable,
    FrequentlyDangerous,
    ExtremelyDangerous,
}

impl ThreatLevel {
    pub const ALL: [ThreatLevel; 6] = [
        Self::Harmless,
        Self::PotentiallyHarmless,
        Self::DangerousIfProvoked,
        Self::Unpredictable,
        Self::FrequentlyDangerous,
        Self::ExtremelyDangerous,
    ];

    /// Stored label, e.g. `"Dangerous if Provoked"`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Harmless => "Harmless",
            Self::PotentiallyHarmless => "Potentially Harmless",
            Self::DangerousIfProvoked => "Dangerous if Provoked",
            Self::Unpredictable => "Unpredictable",
            Self::FrequentlyDangerous => "Frequently Dangerous",
            Self::ExtremelyDangerous => "Extremely Dangerous",
        }
    }

    /// camelCase counter name used by the biodiversity summary.
    pub fn summary_key(self) -> &'static str {
        match self {
            Self::Harmless => "harmless",
            Self::PotentiallyHarmless => "potentiallyHarmless",
            Self::DangerousIfProvoked => "dangerousIfProvoked",
            Self::Unpredictable => "unpredictable",
            Self::FrequentlyDangerous => "frequentlyDangerous",
            Self::ExtremelyDangerous => "extremelyDangerous",
        }
    }
}

/// Report label for a stored threat value: absent or empty maps to `"Unknown"`.
pub fn threat_label(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => UNKNOWN_THREAT,
    }
}
