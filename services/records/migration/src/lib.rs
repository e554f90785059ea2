//! One-off backfill of the `isActive` flag on records created before it existed.
//!
//! The run is idempotent: only records *missing* the field are touched, through
//! a single filtered update, so records already marked inactive stay inactive
//! and a second run updates nothing.
//!
//! Precondition: run with no concurrent writers. Nothing here takes a lock.

use std::fmt;

use bson::doc;
use tracing::info;

use pelfish_core::store::{DocumentStore, Filter, StoreError};
use pelfish_records_schema::records;

/// Record counts by lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    /// Records without an `isActive` field.
    pub missing: u64,
}

impl fmt::Display for Totals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total={} active={} inactive={} missing={}",
            self.total, self.active, self.inactive, self.missing
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The collection is empty.
    NothingToMigrate,
    /// Every record already carries the flag; nothing was written.
    AlreadyMigrated,
    /// Records missing the flag were marked active.
    Backfilled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub outcome: Outcome,
    pub before: Totals,
    pub after: Totals,
    /// Records modified by this run.
    pub updated: u64,
}

#[derive(Debug, thiserror::Error)]
#[error("migration failed while trying to {step}")]
pub struct MigrationError {
    pub step: &'static str,
    #[source]
    pub source: StoreError,
}

fn at(step: &'static str) -> impl FnOnce(StoreError) -> MigrationError {
    move |source| MigrationError { step, source }
}

/// Count records in each lifecycle state.
pub async fn totals<S: DocumentStore>(store: &S) -> Result<Totals, MigrationError> {
    let (all, active, inactive, missing) = (
        Filter::All,
        records::active(),
        Filter::eq(records::IS_ACTIVE, false),
        records::missing_active(),
    );
    let (total, active, inactive, missing) = tokio::try_join!(
        store.count(records::COLLECTION, &all),
        store.count(records::COLLECTION, &active),
        store.count(records::COLLECTION, &inactive),
        store.count(records::COLLECTION, &missing),
    )
    .map_err(at("count records"))?;
    Ok(Totals {
        total,
        active,
        inactive,
        missing,
    })
}

/// Mark every record lacking `isActive` as active.
pub async fn backfill_is_active<S: DocumentStore>(
    store: &S,
) -> Result<MigrationReport, MigrationError> {
    let total = store
        .count(records::COLLECTION, &Filter::All)
        .await
        .map_err(at("count records"))?;
    if total == 0 {
        info!("no records found, nothing to migrate");
        return Ok(MigrationReport {
            outcome: Outcome::NothingToMigrate,
            before: Totals::default(),
            after: Totals::default(),
            updated: 0,
        });
    }

    let before = totals(store).await?;
    info!(%before, "counted records");
    if before.missing == 0 {
        info!("every record already has isActive, nothing to update");
        return Ok(MigrationReport {
            outcome: Outcome::AlreadyMigrated,
            before,
            after: before,
            updated: 0,
        });
    }

    let outcome = store
        .update_many(
            records::COLLECTION,
            &records::missing_active(),
            doc! { records::IS_ACTIVE: true },
        )
        .await
        .map_err(at("backfill isActive"))?;
    info!(
        matched = outcome.matched,
        modified = outcome.modified,
        "backfilled isActive"
    );

    let after = totals(store).await?;
    info!(%after, "counted records after backfill");
    Ok(MigrationReport {
        outcome: Outcome::Backfilled,
        before,
        after,
        updated: outcome.modified,
    })
}
