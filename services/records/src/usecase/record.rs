use bson::{Bson, Document, doc};
use chrono::{DateTime, Utc};

use pelfish_domain::id::{RecordId, UserId};
use pelfish_records_schema::records::{self, Marker};

use crate::domain::repository::RecordRepository;
use crate::error::RecordsServiceError;

fn required_id(id: Option<String>) -> Result<RecordId, RecordsServiceError> {
    id.filter(|id| !id.is_empty())
        .map(RecordId::new)
        .ok_or(RecordsServiceError::MissingField("_id"))
}

fn audit_fields(updated_by: &UserId, now: DateTime<Utc>) -> Document {
    doc! {
        records::UPDATED_AT: bson::DateTime::from_chrono(now),
        records::UPDATED_BY: updated_by.as_str(),
    }
}

// ── ListRecords ──────────────────────────────────────────────────────────────

pub struct ListRecordsUseCase<R: RecordRepository> {
    pub repo: R,
}

impl<R: RecordRepository> ListRecordsUseCase<R> {
    pub async fn execute(&self) -> Result<Vec<Document>, RecordsServiceError> {
        self.repo.list_active().await
    }
}

// ── GetRecord ────────────────────────────────────────────────────────────────

pub struct GetRecordUseCase<R: RecordRepository> {
    pub repo: R,
}

impl<R: RecordRepository> GetRecordUseCase<R> {
    pub async fn execute(&self, id: &RecordId) -> Result<Document, RecordsServiceError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(RecordsServiceError::RecordNotFound)
    }
}

// ── GetMarkers ───────────────────────────────────────────────────────────────

pub struct GetMarkersUseCase<R: RecordRepository> {
    pub repo: R,
}

impl<R: RecordRepository> GetMarkersUseCase<R> {
    pub async fn execute(&self, id: &RecordId) -> Result<Document, RecordsServiceError> {
        self.repo
            .find_markers(id)
            .await?
            .ok_or(RecordsServiceError::RecordNotFound)
    }
}

// ── UpdateRecord ─────────────────────────────────────────────────────────────

pub struct UpdateRecordInput {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub updated_by: UserId,
    pub now: DateTime<Utc>,
}

/// Edit the descriptive fields of a record. Omitted fields keep their value.
pub struct UpdateRecordUseCase<R: RecordRepository> {
    pub repo: R,
}

impl<R: RecordRepository> UpdateRecordUseCase<R> {
    pub async fn execute(&self, input: UpdateRecordInput) -> Result<(), RecordsServiceError> {
        let id = required_id(input.id)?;
        let mut fields = audit_fields(&input.updated_by, input.now);
        for (field, value) in [
            (records::NAME, input.name),
            (records::DESCRIPTION, input.description),
            (records::IMAGE, input.image),
        ] {
            if let Some(value) = value {
                fields.insert(field, value);
            }
        }
        let outcome = self.repo.update_fields(&id, fields).await?;
        if outcome.matched == 0 {
            return Err(RecordsServiceError::RecordNotFound);
        }
        Ok(())
    }
}

// ── UpdateMarkers ────────────────────────────────────────────────────────────

pub struct UpdateMarkersInput {
    pub id: Option<String>,
    pub markers: Option<Vec<Marker>>,
    pub updated_by: UserId,
    pub now: DateTime<Utc>,
}

/// Replace the marker list of a record.
pub struct UpdateMarkersUseCase<R: RecordRepository> {
    pub repo: R,
}

impl<R: RecordRepository> UpdateMarkersUseCase<R> {
    pub async fn execute(&self, input: UpdateMarkersInput) -> Result<(), RecordsServiceError> {
        let id = required_id(input.id)?;
        let markers = input
            .markers
            .ok_or(RecordsServiceError::MissingField("markers"))?;
        let mut fields = audit_fields(&input.updated_by, input.now);
        let markers: Vec<Bson> = markers
            .into_iter()
            .map(|[lat, lng]| Bson::Array(vec![Bson::Double(lat), Bson::Double(lng)]))
            .collect();
        fields.insert(records::MARKERS, markers);
        let outcome = self.repo.update_fields(&id, fields).await?;
        if outcome.matched == 0 {
            return Err(RecordsServiceError::RecordNotFound);
        }
        Ok(())
    }
}

// ── DeleteRecord ─────────────────────────────────────────────────────────────

/// Permanent removal, kept for legacy admin tooling. Prefer the soft delete.
pub struct DeleteRecordUseCase<R: RecordRepository> {
    pub repo: R,
}

impl<R: RecordRepository> DeleteRecordUseCase<R> {
    pub async fn execute(&self, id: Option<String>) -> Result<(), RecordsServiceError> {
        let id = required_id(id)?;
        if !self.repo.delete(&id).await? {
            return Err(RecordsServiceError::RecordNotFound);
        }
        Ok(())
    }
}
