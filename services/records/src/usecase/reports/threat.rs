use bson::Bson;

use pelfish_core::store::{Accumulator, DocumentStore, GroupKey, Pipeline, StoreError};
use pelfish_domain::threat::{UNKNOWN_THREAT, threat_label};
use pelfish_records_schema::records;

use super::{COUNT, by_count_desc, count_of, group_label, merge_labels};
use crate::domain::types::{ThreatDistribution, ThreatShare};

pub struct ThreatDistributionUseCase<S: DocumentStore> {
    pub store: S,
}

impl<S: DocumentStore> ThreatDistributionUseCase<S> {
    pub async fn execute(&self) -> Result<ThreatDistribution, StoreError> {
        let pipeline = Pipeline::new()
            .matching(records::active())
            .group(GroupKey::field(records::THREAT), [(COUNT, Accumulator::Count)])
            .sort(by_count_desc());
        let rows = self.store.aggregate(records::COLLECTION, &pipeline).await?;

        let counts = rows
            .iter()
            .map(|row| Ok((threat_key(row.get("_id")), count_of(row)?)))
            .collect::<Result<Vec<_>, StoreError>>()?;
        let counts = merge_labels(counts);
        let total: u64 = counts.iter().map(|(_, count)| count).sum();

        let data = counts
            .into_iter()
            .map(|(threat, count)| ThreatShare {
                threat,
                count,
                percentage: percentage(count, total),
            })
            .collect();
        Ok(ThreatDistribution { data, total })
    }
}

/// Label for a grouped threat value. Falsy keys fold into `"Unknown"`;
/// other non-string values are reported as their text.
fn threat_key(key: Option<&Bson>) -> String {
    match key {
        Some(Bson::String(s)) => threat_label(Some(s)).to_owned(),
        None | Some(Bson::Null | Bson::Undefined | Bson::Boolean(false)) => UNKNOWN_THREAT.to_owned(),
        Some(Bson::Int32(0) | Bson::Int64(0)) => UNKNOWN_THREAT.to_owned(),
        Some(Bson::Double(v)) if *v == 0.0 || v.is_nan() => UNKNOWN_THREAT.to_owned(),
        other => group_label(other),
    }
}

/// `count / total * 100` with two decimals; `"0.00"` for an empty total.
pub fn percentage(count: u64, total: u64) -> String {
    if total == 0 {
        return "0.00".to_owned();
    }
    format!("{:.2}", count as f64 / total as f64 * 100.0)
}
