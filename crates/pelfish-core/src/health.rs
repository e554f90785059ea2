use axum::http::StatusCode;
use tracing::warn;

use crate::store::DocumentStore;

/// Handler for `GET /healthz`: the process is up.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe: 200 when the store answers a ping, 503 otherwise.
pub async fn store_readiness<S: DocumentStore>(store: &S) -> StatusCode {
    match store.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
