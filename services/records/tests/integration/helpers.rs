use axum_test::TestServer;
use bson::{Bson, Document};
use chrono::{DateTime, TimeZone, Utc};

use pelfish_core::store::{
    DocumentStore, Filter, FindQuery, Pipeline, StoreError, UpdateOutcome,
};
use pelfish_records::router::build_router;
use pelfish_records::state::AppState;
use pelfish_records_schema::users;
use pelfish_testing::auth::TEST_LOGIN_TOKEN;
use pelfish_testing::fixture::UserFixture;
use pelfish_testing::store::MemoryStore;

pub const TEST_USER_ID: &str = "user-ana";

/// Fixed clock for timeline tests.
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
}

pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 8, 0, 0).unwrap()
}

/// Store holding one signed-in user for [`TEST_LOGIN_TOKEN`].
pub fn signed_in_store() -> MemoryStore {
    MemoryStore::new().with(
        users::COLLECTION,
        [UserFixture::new(TEST_USER_ID)
            .display_name("Ana Reyes")
            .email("ana@example.org")
            .role("admin")
            .login_token(TEST_LOGIN_TOKEN)
            .build()],
    )
}

pub fn test_server<S: DocumentStore + Clone + 'static>(store: &S) -> TestServer {
    let state = AppState {
        store: store.clone(),
    };
    TestServer::new(build_router(state, None)).unwrap()
}

// ── ReportsDown ──────────────────────────────────────────────────────────────

/// Sessions resolve, but every count and aggregation fails.
#[derive(Clone)]
pub struct ReportsDown(pub MemoryStore);

fn down() -> StoreError {
    StoreError::Unavailable("reports down".into())
}

impl DocumentStore for ReportsDown {
    async fn count(&self, _collection: &str, _filter: &Filter) -> Result<u64, StoreError> {
        Err(down())
    }

    async fn find(&self, collection: &str, query: &FindQuery) -> Result<Vec<Document>, StoreError> {
        if collection == users::COLLECTION {
            self.0.find(collection, query).await
        } else {
            Err(down())
        }
    }

    async fn aggregate(
        &self,
        _collection: &str,
        _pipeline: &Pipeline,
    ) -> Result<Vec<Document>, StoreError> {
        Err(down())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        fields: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        self.0.update_one(collection, filter, fields).await
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        fields: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        self.0.update_many(collection, filter, fields).await
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<Bson>, StoreError> {
        self.0.insert_many(collection, documents).await
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        self.0.delete_one(collection, filter).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.0.ping().await
    }
}
