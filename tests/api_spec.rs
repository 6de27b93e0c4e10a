use axum::http::StatusCode;
use axum_test::TestServer;
use glintlock::api::create_router;
use glintlock::models::*;
use glintlock::watcher::{SnapshotStore, StoreStatus};

fn setup() -> (TestServer, SnapshotStore) {
    let store = SnapshotStore::default();
    let app = create_router(store.clone());
    let server = TestServer::new(app).expect("Failed to create test server");
    (server, store)
}

fn loaded_world() -> WorldSnapshot {
    WorldSnapshot::assemble(
        WorldParts {
            quests: vec![Quest {
                name: "Find the ledger".to_string(),
                description: "It is missing".to_string(),
                status: QuestStatus::Active,
            }],
            npcs: vec![Npc {
                name: "Mara Voss".to_string(),
                location: "Old Mill Road".to_string(),
                role: "Merchant".to_string(),
                disposition: Disposition::Cautious,
            }],
            ..Default::default()
        },
        chrono::Utc::now(),
    )
}

mod health {
    use super::*;

    #[tokio::test]
    async fn returns_ok() {
        let (server, _) = setup();

        let response = server.get("/api/v1/health").await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "ok");
    }
}

mod world {
    use super::*;

    #[tokio::test]
    async fn returns_the_initial_snapshot_before_any_load() {
        let (server, _) = setup();

        let response = server.get("/api/v1/world").await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "empty");
        assert!(body["character"].is_null());
        assert_eq!(body["quests"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn returns_the_latest_commit() {
        let (server, store) = setup();
        let generation = store.begin();
        assert!(store.commit(generation, loaded_world()));

        let snapshot: WorldSnapshot = server.get("/api/v1/world").await.json();

        assert_eq!(snapshot.status(), WorldStatus::Loaded);
        assert_eq!(snapshot.quests[0].name, "Find the ledger");
        assert_eq!(snapshot.npcs[0].disposition, Disposition::Cautious);
    }

    #[tokio::test]
    async fn serializes_enums_in_snake_case() {
        let (server, store) = setup();
        let generation = store.begin();
        store.commit(generation, loaded_world());

        let body: serde_json::Value = server.get("/api/v1/world").await.json();

        assert_eq!(body["quests"][0]["status"], "active");
        assert_eq!(body["npcs"][0]["disposition"], "cautious");
    }
}

mod world_status {
    use super::*;

    #[tokio::test]
    async fn reports_generation_and_status() {
        let (server, store) = setup();

        let before: StoreStatus = server.get("/api/v1/world/status").await.json();
        assert_eq!(before.generation, 0);
        assert_eq!(before.status, WorldStatus::Empty);
        assert!(before.updated_at.is_none());

        let generation = store.begin();
        store.commit(generation, loaded_world());

        let after: StoreStatus = server.get("/api/v1/world/status").await.json();
        assert_eq!(after.generation, 1);
        assert_eq!(after.status, WorldStatus::Loaded);
        assert!(after.updated_at.is_some());
    }

    #[tokio::test]
    async fn reports_errors_with_previous_contents() {
        let (server, store) = setup();
        let generation = store.begin();
        store.commit(generation, loaded_world());
        let generation = store.begin();
        store.commit_with(generation, WorldSnapshot::failed);

        let status: StoreStatus = server.get("/api/v1/world/status").await.json();
        let world: WorldSnapshot = server.get("/api/v1/world").await.json();

        assert_eq!(status.status, WorldStatus::Error);
        assert_eq!(world.quests.len(), 1);
    }
}

mod routing {
    use super::*;

    #[tokio::test]
    async fn unknown_routes_are_not_found() {
        let (server, _) = setup();

        let response = server.get("/api/v1/projects").expect_failure().await;

        response.assert_status(StatusCode::NOT_FOUND);
    }
}
