mod handlers;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::watcher::SnapshotStore;

pub fn create_router(store: SnapshotStore) -> Router {
    let api = Router::new()
        // World
        .route("/world", get(handlers::get_world))
        .route("/world/status", get(handlers::get_world_status))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(store)
}
