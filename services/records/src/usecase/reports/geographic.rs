use pelfish_core::serde::document_to_json;
use pelfish_core::store::{DocumentStore, Filter, FindQuery, Projection, StoreError};
use pelfish_records_schema::records;

use super::{TOP_N, count_by_field};
use crate::domain::types::{GeographicReport, NamedCount};

pub struct GeographicUseCase<S: DocumentStore> {
    pub store: S,
}

impl<S: DocumentStore> GeographicUseCase<S> {
    pub async fn execute(&self) -> Result<GeographicReport, StoreError> {
        let points = FindQuery::new(
            records::active()
                .and(Filter::not_empty(records::LATITUDE))
                .and(Filter::not_empty(records::LONGITUDE)),
        )
        .projection(Projection::include([
            records::NAME,
            records::LATITUDE,
            records::LONGITUDE,
            records::MARKERS,
            records::THREAT,
        ]));

        let (by_country, by_municipality, by_barangay, location_data) = tokio::try_join!(
            count_by_field(&self.store, records::COUNTRY, Some(TOP_N)),
            count_by_field(&self.store, records::MUNICIPALITY, Some(TOP_N)),
            count_by_field(&self.store, records::BARANGAY, Some(TOP_N)),
            self.store.find(records::COLLECTION, &points),
        )?;

        Ok(GeographicReport {
            by_country: named(by_country),
            by_municipality: named(by_municipality),
            by_barangay: named(by_barangay),
            location_data: location_data.into_iter().map(document_to_json).collect(),
        })
    }
}

fn named(rows: Vec<(String, u64)>) -> Vec<NamedCount> {
    rows.into_iter()
        .map(|(name, count)| NamedCount { name, count })
        .collect()
}
