//! Document-store port.
//!
//! Services talk to storage only through [`DocumentStore`]: count, find,
//! staged aggregation, filtered updates, bulk insert and single delete.
//! [`mongo::MongoStore`] is the production adapter.

use std::future::Future;

use bson::{Bson, Document};

pub mod mongo;
pub mod query;

pub use mongo::MongoStore;
pub use query::{
    Accumulator, Filter, FindQuery, GroupKey, Pipeline, Projection, SortOrder, Stage,
};

pub use crate::error::StoreError;

/// Result of a filtered update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

/// Asynchronous access to named document collections.
///
/// Every operation is independent: no transactions, no retries. Futures are
/// `Send` so generic handlers can run on a multi-threaded runtime.
pub trait DocumentStore: Send + Sync {
    fn count(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    fn find(
        &self,
        collection: &str,
        query: &FindQuery,
    ) -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send;

    fn aggregate(
        &self,
        collection: &str,
        pipeline: &Pipeline,
    ) -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send;

    /// Apply `$set: fields` to the first matching document.
    fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        fields: Document,
    ) -> impl Future<Output = Result<UpdateOutcome, StoreError>> + Send;

    /// Apply `$set: fields` to every matching document in one atomic filtered update.
    fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        fields: Document,
    ) -> impl Future<Output = Result<UpdateOutcome, StoreError>> + Send;

    /// Insert documents, returning their `_id` values in input order.
    fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> impl Future<Output = Result<Vec<Bson>, StoreError>> + Send;

    /// Delete the first matching document, returning the number removed.
    fn delete_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Cheap round trip proving the store is reachable.
    fn ping(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}

impl<T: DocumentStore> DocumentStore for &T {
    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        (**self).count(collection, filter).await
    }

    async fn find(&self, collection: &str, query: &FindQuery) -> Result<Vec<Document>, StoreError> {
        (**self).find(collection, query).await
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &Pipeline,
    ) -> Result<Vec<Document>, StoreError> {
        (**self).aggregate(collection, pipeline).await
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        fields: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        (**self).update_one(collection, filter, fields).await
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        fields: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        (**self).update_many(collection, filter, fields).await
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<Bson>, StoreError> {
        (**self).insert_many(collection, documents).await
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        (**self).delete_one(collection, filter).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        (**self).ping().await
    }
}
