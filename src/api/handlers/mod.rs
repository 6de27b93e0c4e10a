use axum::{extract::State, response::IntoResponse, Json};

use crate::models::WorldSnapshot;
use crate::watcher::{SnapshotStore, StoreStatus};

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// World
// ============================================================

pub async fn get_world(State(store): State<SnapshotStore>) -> Json<WorldSnapshot> {
    Json(store.current().as_ref().clone())
}

pub async fn get_world_status(State(store): State<SnapshotStore>) -> Json<StoreStatus> {
    Json(store.status())
}
