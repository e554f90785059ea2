//! Aggregation engine behind the dashboard reports.
//!
//! Each builder runs staged pipelines over active records only and reshapes
//! the rows into the report types. Builders never write and never cache.

pub mod biodiversity;
pub mod geographic;
pub mod threat;
pub mod user_activity;

use bson::{Bson, Document};

use pelfish_core::bson_ext::{as_non_empty_str, i64_field};
use pelfish_core::store::{Accumulator, DocumentStore, Filter, GroupKey, Pipeline, SortOrder, StoreError};
use pelfish_records_schema::records;

/// Cap for ranked location and use lists.
pub const TOP_N: i64 = 10;

pub(crate) const COUNT: &str = "count";

/// `count desc, _id asc`: ties resolve by group key.
pub(crate) fn by_count_desc() -> [(&'static str, SortOrder); 2] {
    [(COUNT, SortOrder::Desc), ("_id", SortOrder::Asc)]
}

/// Count active records per non-empty value of `field`, most frequent first.
pub(crate) async fn count_by_field<S: DocumentStore>(
    store: &S,
    field: &str,
    limit: Option<i64>,
) -> Result<Vec<(String, u64)>, StoreError> {
    let mut pipeline = Pipeline::new()
        .matching(records::active().and(Filter::not_empty(field)))
        .group(GroupKey::field(field), [(COUNT, Accumulator::Count)])
        .sort(by_count_desc());
    if let Some(limit) = limit {
        pipeline = pipeline.limit(limit);
    }
    let rows = store.aggregate(records::COLLECTION, &pipeline).await?;
    rows.iter()
        .map(|row| Ok((group_label(row.get("_id")), count_of(row)?)))
        .collect()
}

/// Text for a group key. Non-string keys are rendered as JSON-ish text.
pub(crate) fn group_label(key: Option<&Bson>) -> String {
    match key {
        Some(Bson::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Non-empty string group key, if any.
pub(crate) fn group_text(row: &Document) -> Option<&str> {
    row.get("_id").and_then(as_non_empty_str)
}

pub(crate) fn count_of(row: &Document) -> Result<u64, StoreError> {
    i64_field(row, COUNT)
        .and_then(|n| u64::try_from(n).ok())
        .ok_or_else(|| StoreError::malformed(records::COLLECTION, "group row without a count"))
}

/// Fold rows that share a display label, keeping `count desc, label asc` order.
///
/// Needed where several raw keys (missing, `null`, `""`) map to one fallback.
pub(crate) fn merge_labels(rows: impl IntoIterator<Item = (String, u64)>) -> Vec<(String, u64)> {
    let mut merged: Vec<(String, u64)> = Vec::new();
    for (label, count) in rows {
        match merged.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, total)) => *total += count,
            None => merged.push((label, count)),
        }
    }
    merged.sort_by(|(la, ca), (lb, cb)| cb.cmp(ca).then_with(|| la.cmp(lb)));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use pelfish_testing::fixture::RecordFixture;
    use pelfish_testing::store::MemoryStore;

    #[tokio::test]
    async fn count_by_field_skips_empty_and_inactive() {
        let store = MemoryStore::new().with(
            records::COLLECTION,
            [
                RecordFixture::new("1").uses("Food").build(),
                RecordFixture::new("2").uses("Food").build(),
                RecordFixture::new("3").uses("").build(),
                RecordFixture::new("4").build(),
                RecordFixture::new("5").uses("Aquarium").build(),
                RecordFixture::new("6").uses("Aquarium").inactive().build(),
                RecordFixture::new("7").uses("Bait").build(),
            ],
        );
        let rows = count_by_field(&store, records::USES, None).await.unwrap();
        assert_eq!(
            rows,
            vec![
                ("Food".to_owned(), 2),
                ("Aquarium".to_owned(), 1),
                ("Bait".to_owned(), 1),
            ]
        );
    }

    #[test]
    fn merge_labels_sums_and_reorders() {
        let merged = merge_labels([
            ("Harmless".to_owned(), 3),
            ("Unknown".to_owned(), 2),
            ("Dangerous".to_owned(), 2),
            ("Unknown".to_owned(), 2),
        ]);
        assert_eq!(
            merged,
            vec![
                ("Unknown".to_owned(), 4),
                ("Harmless".to_owned(), 3),
                ("Dangerous".to_owned(), 2),
            ]
        );
    }
}
