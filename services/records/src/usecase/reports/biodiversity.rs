use bson::{Bson, Document};

use pelfish_core::bson_ext::{f64_field, i64_field};
use pelfish_core::store::{Accumulator, DocumentStore, Filter, GroupKey, Pipeline, StoreError};
use pelfish_domain::threat::ThreatLevel;
use pelfish_records_schema::records;

use super::{TOP_N, count_by_field};
use crate::domain::types::{
    BiodiversityReport, EnvironmentCount, LocationDiversity, SizeMaturityStats, ThreatSummary,
    UseCount,
};

const AVG_MAX_SIZE: &str = "avgMaxSize";
const MIN_MAX_SIZE: &str = "minMaxSize";
const MAX_MAX_SIZE: &str = "maxMaxSize";
const AVG_MATURITY: &str = "avgMaturity";

pub struct BiodiversityUseCase<S: DocumentStore> {
    pub store: S,
}

impl<S: DocumentStore> BiodiversityUseCase<S> {
    pub async fn execute(&self) -> Result<BiodiversityReport, StoreError> {
        let active = records::active();
        let (total_species, by_environment, threat_summary, by_location, size_stats, uses) =
            tokio::try_join!(
                self.store.count(records::COLLECTION, &active),
                count_by_field(&self.store, records::ENVIRONMENT, None),
                self.threat_summary(),
                self.diversity_by_location(),
                self.size_maturity_stats(),
                count_by_field(&self.store, records::USES, Some(TOP_N)),
            )?;

        Ok(BiodiversityReport {
            total_species,
            by_environment: by_environment
                .into_iter()
                .map(|(environment, count)| EnvironmentCount { environment, count })
                .collect(),
            threat_summary,
            diversity_by_location: by_location,
            size_maturity_stats: size_stats,
            uses_distribution: uses
                .into_iter()
                .map(|(use_, count)| UseCount { use_, count })
                .collect(),
        })
    }

    /// One pass counting each conventional threat label.
    async fn threat_summary(&self) -> Result<ThreatSummary, StoreError> {
        let pipeline = Pipeline::new().matching(records::active()).group(
            GroupKey::Null,
            ThreatLevel::ALL.map(|level| {
                (
                    level.summary_key(),
                    Accumulator::CountIfEq(records::THREAT.to_owned(), Bson::from(level.label())),
                )
            }),
        );
        let rows = self.store.aggregate(records::COLLECTION, &pipeline).await?;
        let Some(row) = rows.first() else {
            return Ok(ThreatSummary::default());
        };
        let tally = |level: ThreatLevel| {
            i64_field(row, level.summary_key())
                .and_then(|n| u64::try_from(n).ok())
                .unwrap_or(0)
        };
        Ok(ThreatSummary {
            harmless: tally(ThreatLevel::Harmless),
            potentially_harmless: tally(ThreatLevel::PotentiallyHarmless),
            dangerous_if_provoked: tally(ThreatLevel::DangerousIfProvoked),
            unpredictable: tally(ThreatLevel::Unpredictable),
            frequently_dangerous: tally(ThreatLevel::FrequentlyDangerous),
            extremely_dangerous: tally(ThreatLevel::ExtremelyDangerous),
        })
    }

    /// Top municipalities by number of active records.
    async fn diversity_by_location(&self) -> Result<Vec<LocationDiversity>, StoreError> {
        let rows = count_by_field(&self.store, records::MUNICIPALITY, Some(TOP_N)).await?;
        Ok(rows
            .into_iter()
            .map(|(location, species_count)| LocationDiversity {
                location,
                species_count,
            })
            .collect())
    }

    /// Averages and bounds over records with a positive numeric size.
    async fn size_maturity_stats(&self) -> Result<SizeMaturityStats, StoreError> {
        let pipeline = Pipeline::new()
            .matching(records::active().and(Filter::gt(records::MAX, 0)))
            .group(
                GroupKey::Null,
                [
                    (AVG_MAX_SIZE, Accumulator::Avg(records::MAX.to_owned())),
                    (MIN_MAX_SIZE, Accumulator::Min(records::MAX.to_owned())),
                    (MAX_MAX_SIZE, Accumulator::Max(records::MAX.to_owned())),
                    (AVG_MATURITY, Accumulator::Avg(records::MATURITY.to_owned())),
                ],
            );
        let rows = self.store.aggregate(records::COLLECTION, &pipeline).await?;
        Ok(rows.first().map_or_else(SizeMaturityStats::empty, size_stats_from_row))
    }
}

fn size_stats_from_row(row: &Document) -> SizeMaturityStats {
    SizeMaturityStats {
        avg_max_size: f64_field(row, AVG_MAX_SIZE).unwrap_or(0.0),
        min_max_size: f64_field(row, MIN_MAX_SIZE).unwrap_or(0.0),
        max_max_size: f64_field(row, MAX_MAX_SIZE).unwrap_or(0.0),
        avg_maturity: f64_field(row, AVG_MATURITY),
    }
}
