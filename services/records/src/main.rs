use axum::http::HeaderValue;
use tracing::{info, warn};

use pelfish_core::store::MongoStore;
use pelfish_core::tracing::init_tracing;
use pelfish_records::config::{RecordsConfig, database_warning};
use pelfish_records::router::build_router;
use pelfish_records::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = RecordsConfig::from_env();

    if cfg!(debug_assertions) {
        if let Some(warning) = database_warning(&config.database_url) {
            warn!("{warning}");
        }
    }

    // Connects lazily on the first store call.
    let store = MongoStore::new(config.database_url, config.database_name);

    let cors_origin = config
        .cors_allowed_origin
        .as_deref()
        .map(|origin| HeaderValue::from_str(origin).expect("invalid CORS_ALLOWED_ORIGIN"));

    let router = build_router(AppState { store }, cors_origin);
    let addr = format!("0.0.0.0:{}", config.records_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("records service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
