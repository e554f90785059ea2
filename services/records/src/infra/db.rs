use anyhow::Context as _;
use bson::{Bson, Document};

use pelfish_core::bson_ext::id_string;
use pelfish_core::store::{DocumentStore, Filter, FindQuery, Projection, SortOrder, UpdateOutcome};
use pelfish_domain::id::RecordId;
use pelfish_records_schema::records::{self, NewRecordDocument};
use pelfish_records_schema::users::{self, UserDocument};

use crate::domain::repository::{RecordRepository, UserRepository};
use crate::error::RecordsServiceError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository<S> {
    pub store: S,
}

impl<S: DocumentStore> UserRepository for DbUserRepository<S> {
    async fn find_by_session_token(
        &self,
        token: &str,
    ) -> Result<Option<UserDocument>, RecordsServiceError> {
        let query = FindQuery::new(Filter::eq(users::SESSION_TOKEN, token))
            .projection(Projection::include([users::PROFILE, users::EMAILS, users::ROLE]))
            .limit(1);
        let found = self
            .store
            .find(users::COLLECTION, &query)
            .await
            .context("find user by session token")?;
        let user = found
            .into_iter()
            .next()
            .map(bson::from_document::<UserDocument>)
            .transpose()
            .context("decode user document")?;
        Ok(user)
    }
}

// ── Record repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRecordRepository<S> {
    pub store: S,
}

fn by_id(id: &RecordId) -> Filter {
    Filter::eq(records::ID, id.as_str())
}

impl<S: DocumentStore> RecordRepository for DbRecordRepository<S> {
    async fn list_active(&self) -> Result<Vec<Document>, RecordsServiceError> {
        let query = FindQuery::new(records::active())
            .projection(Projection::exclude([records::IMAGE]))
            .sort_by(records::CREATED, SortOrder::Desc);
        let docs = self
            .store
            .find(records::COLLECTION, &query)
            .await
            .context("list active records")?;
        Ok(docs)
    }

    async fn find_by_id(&self, id: &RecordId) -> Result<Option<Document>, RecordsServiceError> {
        let query = FindQuery::new(by_id(id)).limit(1);
        let docs = self
            .store
            .find(records::COLLECTION, &query)
            .await
            .context("find record by id")?;
        Ok(docs.into_iter().next())
    }

    async fn find_markers(&self, id: &RecordId) -> Result<Option<Document>, RecordsServiceError> {
        let query = FindQuery::new(by_id(id))
            .projection(Projection::include([records::MARKERS]))
            .limit(1);
        let docs = self
            .store
            .find(records::COLLECTION, &query)
            .await
            .context("find record markers")?;
        Ok(docs.into_iter().next())
    }

    async fn insert_many(
        &self,
        new_records: Vec<NewRecordDocument>,
    ) -> Result<Vec<RecordId>, RecordsServiceError> {
        let documents = new_records
            .iter()
            .map(bson::to_document)
            .collect::<Result<Vec<Document>, _>>()
            .context("encode record documents")?;
        let ids = self
            .store
            .insert_many(records::COLLECTION, documents)
            .await
            .context("insert records")?;
        ids.iter()
            .map(|id| {
                id_string(id)
                    .map(RecordId::new)
                    .ok_or_else(|| unexpected_id(id))
            })
            .collect()
    }

    async fn update_fields(
        &self,
        id: &RecordId,
        fields: Document,
    ) -> Result<UpdateOutcome, RecordsServiceError> {
        let outcome = self
            .store
            .update_one(records::COLLECTION, &by_id(id), fields)
            .await
            .context("update record")?;
        Ok(outcome)
    }

    async fn delete(&self, id: &RecordId) -> Result<bool, RecordsServiceError> {
        let deleted = self
            .store
            .delete_one(records::COLLECTION, &by_id(id))
            .await
            .context("delete record")?;
        Ok(deleted > 0)
    }
}

fn unexpected_id(id: &Bson) -> RecordsServiceError {
    RecordsServiceError::Internal(anyhow::anyhow!("store returned unusable record id {id}"))
}
