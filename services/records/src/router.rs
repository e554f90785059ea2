use axum::{
    Router,
    http::HeaderValue,
    routing::{get, patch, post},
};
use tower_http::trace::TraceLayer;

use pelfish_core::health::healthz;
use pelfish_core::middleware::{cors_layer, request_id_layer};
use pelfish_core::store::DocumentStore;

use crate::handlers::{
    health::readyz,
    record::{
        delete_record, get_markers, get_record, list_records, set_record_active, update_markers,
        update_record, upload_records,
    },
    reports::{biodiversity, geographic_stats, threat_distribution, user_activity},
    session::{get_session, logout},
};
use crate::state::AppState;

/// Routes under `/api`, served with the CORS policy.
fn api_routes<S: DocumentStore + Clone + 'static>() -> Router<AppState<S>> {
    Router::new()
        // Session
        .route("/session", get(get_session))
        // Records
        .route("/admin/record", get(list_records::<S>))
        .route("/admin/record/upload", post(upload_records::<S>))
        .route("/admin/record/update", post(update_record::<S>))
        .route("/admin/record/update-marker", post(update_markers::<S>))
        .route("/admin/record/delete", post(delete_record::<S>))
        .route("/admin/record/{record_id}", get(get_record::<S>))
        .route("/admin/record/{record_id}/markers", get(get_markers::<S>))
        .route("/admin/record/{record_id}/active", patch(set_record_active::<S>))
        // Reports
        .route("/admin/reports/biodiversity", get(biodiversity::<S>))
        .route("/admin/reports/geographic-stats", get(geographic_stats::<S>))
        .route("/admin/reports/threat-distribution", get(threat_distribution::<S>))
        .route("/admin/reports/user-activity", get(user_activity::<S>))
}

pub fn build_router<S: DocumentStore + Clone + 'static>(
    state: AppState<S>,
    cors_origin: Option<HeaderValue>,
) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz::<S>))
        // Session
        .route("/auth/logout", post(logout))
        .nest("/api", api_routes::<S>().layer(cors_layer(cors_origin)))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
