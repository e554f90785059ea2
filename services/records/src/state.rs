use pelfish_core::store::{DocumentStore, MongoStore};

use crate::infra::db::{DbRecordRepository, DbUserRepository};

/// Shared application state passed to every handler via axum `State`.
///
/// The store is the only shared resource; cloning the state clones a handle.
#[derive(Clone)]
pub struct AppState<S = MongoStore> {
    pub store: S,
}

impl<S: DocumentStore + Clone> AppState<S> {
    pub fn user_repo(&self) -> DbUserRepository<S> {
        DbUserRepository {
            store: self.store.clone(),
        }
    }

    pub fn record_repo(&self) -> DbRecordRepository<S> {
        DbRecordRepository {
            store: self.store.clone(),
        }
    }
}
