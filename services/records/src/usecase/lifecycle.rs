//! Ownership of the `isActive` flag for records created and toggled through
//! the service. The one-off backfill of legacy records lives in the
//! migration crate.

use bson::doc;
use chrono::{DateTime, Utc};

use pelfish_domain::id::{RecordId, UserId};
use pelfish_records_schema::records::{self, NewRecordDocument, RecordFields};

use crate::domain::repository::RecordRepository;
use crate::error::RecordsServiceError;

/// Stamp identity and lifecycle fields on imported content.
///
/// New records are always active, whatever the payload contained.
pub fn new_record(fields: RecordFields, created_by: &UserId, now: DateTime<Utc>) -> NewRecordDocument {
    let now = bson::DateTime::from_chrono(now);
    NewRecordDocument {
        id: RecordId::generate(),
        fields,
        created: now,
        created_at: now,
        created_by: created_by.clone(),
        is_active: true,
    }
}

// ── CreateRecords ────────────────────────────────────────────────────────────

pub struct CreateRecordsInput {
    pub records: Vec<RecordFields>,
    pub created_by: UserId,
    pub now: DateTime<Utc>,
}

pub struct CreateRecordsUseCase<R: RecordRepository> {
    pub repo: R,
}

impl<R: RecordRepository> CreateRecordsUseCase<R> {
    /// Insert the batch; returns the new ids in input order.
    pub async fn execute(
        &self,
        input: CreateRecordsInput,
    ) -> Result<Vec<RecordId>, RecordsServiceError> {
        if input.records.is_empty() {
            return Ok(Vec::new());
        }
        let documents = input
            .records
            .into_iter()
            .map(|fields| new_record(fields, &input.created_by, input.now))
            .collect();
        self.repo.insert_many(documents).await
    }
}

// ── SetActive ────────────────────────────────────────────────────────────────

pub struct SetActiveInput {
    pub id: RecordId,
    pub is_active: bool,
    pub updated_by: UserId,
    pub now: DateTime<Utc>,
}

/// Soft delete (`false`) or restore (`true`) a record.
pub struct SetActiveUseCase<R: RecordRepository> {
    pub repo: R,
}

impl<R: RecordRepository> SetActiveUseCase<R> {
    pub async fn execute(&self, input: SetActiveInput) -> Result<(), RecordsServiceError> {
        let fields = doc! {
            records::IS_ACTIVE: input.is_active,
            records::UPDATED_AT: bson::DateTime::from_chrono(input.now),
            records::UPDATED_BY: input.updated_by.as_str(),
        };
        let outcome = self.repo.update_fields(&input.id, fields).await?;
        if outcome.matched == 0 {
            return Err(RecordsServiceError::RecordNotFound);
        }
        Ok(())
    }
}
