use axum::{extract::State, http::StatusCode};

use pelfish_core::health::store_readiness;
use pelfish_core::store::DocumentStore;

use crate::state::AppState;

/// Handler for `GET /readyz`.
pub async fn readyz<S: DocumentStore + Clone + 'static>(
    State(state): State<AppState<S>>,
) -> StatusCode {
    store_readiness(&state.store).await
}
