use std::collections::HashMap;

use bson::{Bson, Document};
use chrono::{DateTime, Months, Utc};

use pelfish_core::bson_ext::{i64_field, id_string};
use pelfish_core::store::{
    Accumulator, DocumentStore, Filter, FindQuery, GroupKey, Pipeline, Projection, SortOrder,
    StoreError,
};
use pelfish_domain::user::{
    CONTRIBUTOR_ROLE_FALLBACK, ROLE_BREAKDOWN_FALLBACK, resolve_display_name, role_label,
};
use pelfish_records_schema::records;
use pelfish_records_schema::users::{self, UserDocument};

use super::{COUNT, by_count_desc, count_of, group_text, merge_labels};
use crate::domain::types::{Contributor, RoleCount, TimelinePoint, UserActivityReport};

/// Length of the activity timeline window.
pub const TIMELINE_MONTHS: u32 = 12;

const USER_INFO: &str = "userInfo";

pub struct UserActivityUseCase<S: DocumentStore> {
    pub store: S,
}

impl<S: DocumentStore> UserActivityUseCase<S> {
    /// Build the report with the timeline window ending at `now`.
    pub async fn execute(&self, now: DateTime<Utc>) -> Result<UserActivityReport, StoreError> {
        let (top_contributors, timeline, by_role) = tokio::try_join!(
            self.top_contributors(),
            self.timeline(now),
            self.by_role(),
        )?;
        Ok(UserActivityReport {
            top_contributors,
            timeline,
            by_role,
        })
    }

    /// Records per owner, joined to the owner's name and role.
    async fn top_contributors(&self) -> Result<Vec<Contributor>, StoreError> {
        let pipeline = Pipeline::new()
            .matching(owned_active())
            .group(GroupKey::field(records::CREATED_BY), [(COUNT, Accumulator::Count)])
            .sort(by_count_desc());
        let rows = self.store.aggregate(records::COLLECTION, &pipeline).await?;

        let owner_ids: Vec<Bson> = rows
            .iter()
            .filter_map(|row| row.get("_id"))
            .filter(|id| !matches!(id, Bson::Null))
            .cloned()
            .collect();
        let owners = self.owners(owner_ids).await?;

        rows.iter()
            .map(|row| {
                let user_id = row.get("_id").and_then(id_string);
                let owner = user_id.as_deref().and_then(|id| owners.get(id));
                Ok(Contributor {
                    user_name: resolve_display_name(
                        owner.and_then(|o| o.profile.as_ref()),
                    ),
                    role: role_label(owner.and_then(UserDocument::role), CONTRIBUTOR_ROLE_FALLBACK)
                        .to_owned(),
                    records_created: count_of(row)?,
                    user_id,
                })
            })
            .collect()
    }

    async fn owners(&self, ids: Vec<Bson>) -> Result<HashMap<String, UserDocument>, StoreError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let query = FindQuery::new(Filter::is_in(users::ID, ids)).projection(Projection::include([
            users::PROFILE_DISPLAY_NAME,
            users::PROFILE_FIRST_NAME,
            users::PROFILE_LAST_NAME,
            users::ROLE,
        ]));
        let docs = self.store.find(users::COLLECTION, &query).await?;
        docs.into_iter()
            .filter_map(|doc| {
                let id = doc.get("_id").and_then(id_string)?;
                Some(
                    bson::from_document::<UserDocument>(doc)
                        .map(|user| (id, user))
                        .map_err(|e| StoreError::malformed(users::COLLECTION, e)),
                )
            })
            .collect()
    }

    /// Monthly creation counts over the trailing window, oldest month first.
    async fn timeline(&self, now: DateTime<Utc>) -> Result<Vec<TimelinePoint>, StoreError> {
        let since = timeline_start(now);
        let pipeline = Pipeline::new()
            .matching(
                records::active()
                    .and(Filter::exists(records::CREATED))
                    .and(Filter::gte(records::CREATED, bson::DateTime::from_chrono(since))),
            )
            .group(GroupKey::YearMonth(records::CREATED.to_owned()), [(COUNT, Accumulator::Count)])
            .sort([("_id.year", SortOrder::Asc), ("_id.month", SortOrder::Asc)]);
        let rows = self.store.aggregate(records::COLLECTION, &pipeline).await?;
        rows.iter().filter_map(timeline_point).collect()
    }

    /// Records per owner role. Records whose owner cannot be found are dropped.
    async fn by_role(&self) -> Result<Vec<RoleCount>, StoreError> {
        let role_path = format!("{USER_INFO}.{}", users::ROLE);
        let pipeline = Pipeline::new()
            .matching(owned_active())
            .lookup(users::COLLECTION, records::CREATED_BY, users::ID, USER_INFO)
            .unwind(USER_INFO)
            .group(GroupKey::field(role_path), [(COUNT, Accumulator::Count)])
            .sort(by_count_desc());
        let rows = self.store.aggregate(records::COLLECTION, &pipeline).await?;
        let counts = rows
            .iter()
            .map(|row| {
                let role = role_label(group_text(row), ROLE_BREAKDOWN_FALLBACK).to_owned();
                Ok((role, count_of(row)?))
            })
            .collect::<Result<Vec<_>, StoreError>>()?;
        Ok(merge_labels(counts)
            .into_iter()
            .map(|(role, count)| RoleCount { role, count })
            .collect())
    }
}

fn owned_active() -> Filter {
    records::active().and(Filter::exists(records::CREATED_BY))
}

/// First instant inside the timeline window.
pub fn timeline_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(TIMELINE_MONTHS))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Rows whose key is not a calendar month (non-date `created`) are skipped.
fn timeline_point(row: &Document) -> Option<Result<TimelinePoint, StoreError>> {
    let year = i32::try_from(i64_field(row, "_id.year")?).ok()?;
    let month = u32::try_from(i64_field(row, "_id.month")?).ok()?;
    Some(count_of(row).map(|count| TimelinePoint {
        year,
        month,
        count,
        label: format!("{year}-{month:02}"),
    }))
}
