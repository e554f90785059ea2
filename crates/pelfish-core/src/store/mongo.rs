//! MongoDB adapter for [`DocumentStore`].

use std::sync::Arc;

use bson::{Bson, Document, doc};
use futures::TryStreamExt;
use mongodb::{Client, Collection, Database};
use tokio::sync::OnceCell;
use tracing::info;

use super::query::{FindQuery, Pipeline, sort_document};
use super::{DocumentStore, Filter, StoreError, UpdateOutcome};

/// Database used when neither an explicit name nor a URI default is given.
pub const DEFAULT_DATABASE: &str = "pelfish";

/// Process-wide MongoDB handle.
///
/// Cloning is cheap and shares one lazily established connection: the client
/// is created on first use, exactly once, and reused by every clone. A failed
/// attempt leaves the cell empty so the next request tries again.
#[derive(Clone)]
pub struct MongoStore {
    inner: Arc<Inner>,
}

struct Inner {
    uri: String,
    database_name: Option<String>,
    database: OnceCell<Database>,
}

impl MongoStore {
    /// Configure the store without connecting.
    ///
    /// `database_name` overrides the database named in the URI.
    pub fn new(uri: impl Into<String>, database_name: Option<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                uri: uri.into(),
                database_name,
                database: OnceCell::new(),
            }),
        }
    }

    /// The shared database handle, connecting on first call.
    pub async fn database(&self) -> Result<&Database, StoreError> {
        self.inner
            .database
            .get_or_try_init(|| async {
                let client = Client::with_uri_str(&self.inner.uri)
                    .await
                    .map_err(StoreError::Connect)?;
                let database = match &self.inner.database_name {
                    Some(name) => client.database(name),
                    None => client
                        .default_database()
                        .unwrap_or_else(|| client.database(DEFAULT_DATABASE)),
                };
                info!(database = database.name(), "document store connected");
                Ok(database)
            })
            .await
    }

    async fn collection(&self, name: &str) -> Result<Collection<Document>, StoreError> {
        Ok(self.database().await?.collection::<Document>(name))
    }
}

impl DocumentStore for MongoStore {
    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        self.collection(collection)
            .await?
            .count_documents(filter.to_document())
            .await
            .map_err(|e| StoreError::operation("count", collection, e))
    }

    async fn find(&self, collection: &str, query: &FindQuery) -> Result<Vec<Document>, StoreError> {
        let coll = self.collection(collection).await?;
        let mut find = coll.find(query.filter.to_document());
        if let Some(projection) = query.projection.to_document() {
            find = find.projection(projection);
        }
        if !query.sort.is_empty() {
            find = find.sort(sort_document(&query.sort));
        }
        if let Some(limit) = query.limit {
            find = find.limit(limit);
        }
        let cursor = find
            .await
            .map_err(|e| StoreError::operation("find", collection, e))?;
        cursor
            .try_collect()
            .await
            .map_err(|e| StoreError::operation("find", collection, e))
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &Pipeline,
    ) -> Result<Vec<Document>, StoreError> {
        let cursor = self
            .collection(collection)
            .await?
            .aggregate(pipeline.to_documents())
            .await
            .map_err(|e| StoreError::operation("aggregate", collection, e))?;
        cursor
            .try_collect()
            .await
            .map_err(|e| StoreError::operation("aggregate", collection, e))
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        fields: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        let result = self
            .collection(collection)
            .await?
            .update_one(filter.to_document(), doc! { "$set": fields })
            .await
            .map_err(|e| StoreError::operation("update_one", collection, e))?;
        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        fields: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        let result = self
            .collection(collection)
            .await?
            .update_many(filter.to_document(), doc! { "$set": fields })
            .await
            .map_err(|e| StoreError::operation("update_many", collection, e))?;
        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<Bson>, StoreError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }
        let result = self
            .collection(collection)
            .await?
            .insert_many(documents)
            .await
            .map_err(|e| StoreError::operation("insert_many", collection, e))?;
        let mut ids: Vec<(usize, Bson)> = result.inserted_ids.into_iter().collect();
        ids.sort_by_key(|(index, _)| *index);
        Ok(ids.into_iter().map(|(_, id)| id).collect())
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let result = self
            .collection(collection)
            .await?
            .delete_one(filter.to_document())
            .await
            .map_err(|e| StoreError::operation("delete_one", collection, e))?;
        Ok(result.deleted_count)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.database()
            .await?
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::operation("ping", "admin", e))?;
        Ok(())
    }
}
