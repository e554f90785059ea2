/// Failure of a document-store operation.
///
/// Carries enough context for logs; callers decide what (if anything) reaches
/// a client. Store errors are never retried automatically.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to connect to document store")]
    Connect(#[source] mongodb::error::Error),
    #[error("{operation} on `{collection}` failed")]
    Operation {
        operation: &'static str,
        collection: String,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("malformed document in `{collection}`: {reason}")]
    Malformed { collection: String, reason: String },
    #[error("document store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn operation(
        operation: &'static str,
        collection: &str,
        source: mongodb::error::Error,
    ) -> Self {
        Self::Operation {
            operation,
            collection: collection.to_owned(),
            source,
        }
    }

    pub fn malformed(collection: &str, reason: impl ToString) -> Self {
        Self::Malformed {
            collection: collection.to_owned(),
            reason: reason.to_string(),
        }
    }
}
