use std::future::Future;

use bson::Document;

use pelfish_core::store::UpdateOutcome;
use pelfish_domain::id::RecordId;
use pelfish_records_schema::records::NewRecordDocument;
use pelfish_records_schema::users::UserDocument;

use crate::error::RecordsServiceError;

// Futures are spelled out as `Send` so handlers generic over the store stay
// spawnable.

/// Lookup of user accounts.
pub trait UserRepository: Send + Sync {
    /// The user holding `token` among its resume tokens, if any.
    fn find_by_session_token(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<UserDocument>, RecordsServiceError>> + Send;
}

/// Access to species records. Documents are returned as stored.
pub trait RecordRepository: Send + Sync {
    /// Active records, newest first, without images.
    fn list_active(&self)
    -> impl Future<Output = Result<Vec<Document>, RecordsServiceError>> + Send;

    /// Full record including its image, regardless of `isActive`.
    fn find_by_id(
        &self,
        id: &RecordId,
    ) -> impl Future<Output = Result<Option<Document>, RecordsServiceError>> + Send;

    /// `_id` and `markers` of a record.
    fn find_markers(
        &self,
        id: &RecordId,
    ) -> impl Future<Output = Result<Option<Document>, RecordsServiceError>> + Send;

    fn insert_many(
        &self,
        records: Vec<NewRecordDocument>,
    ) -> impl Future<Output = Result<Vec<RecordId>, RecordsServiceError>> + Send;

    /// Set `fields` on the record with `id`.
    fn update_fields(
        &self,
        id: &RecordId,
        fields: Document,
    ) -> impl Future<Output = Result<UpdateOutcome, RecordsServiceError>> + Send;

    /// Remove the record permanently. Returns `true` if a document was deleted.
    fn delete(
        &self,
        id: &RecordId,
    ) -> impl Future<Output = Result<bool, RecordsServiceError>> + Send;
}
