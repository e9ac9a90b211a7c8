//! Smart Chair Backend Server
//!
//! Classifies sitting posture from seat pressure sensors and pose keypoints,
//! records every verdict and streams them live to connected dashboards.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      SMART CHAIR CLOUD                       │
//! ├──────────────────────────────────────────────────────────────┤
//! │  POST /chair ─┐                                              │
//! │  POST /posenet┼─► IngestionPipeline ─► PostureClassifier     │
//! │  WS poseData ─┘          │                                   │
//! │                          ├─► ReadingStore ◄─ GET /api/history│
//! │                          │   (PostgreSQL / memory)           │
//! │                          └─► BroadcastHub ─► WS /ws clients  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod db;
pub mod models;
pub mod classifier;
pub mod store;
pub mod hub;
pub mod pipeline;
pub mod history;
pub mod throttle;
pub mod handlers;
pub mod error;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};

pub use error::{AppError, AppResult};

use config::Config;
use history::HistoryQueryService;
use hub::BroadcastHub;
use pipeline::IngestionPipeline;
use store::ReadingStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<IngestionPipeline>,
    pub hub: Arc<BroadcastHub>,
    pub history: HistoryQueryService,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn ReadingStore>, config: Config) -> Self {
        let hub = Arc::new(BroadcastHub::new(config.subscriber_queue_capacity));
        let pipeline = Arc::new(IngestionPipeline::new(store.clone(), hub.clone()));
        let history = HistoryQueryService::new(
            store,
            config.history_default_limit,
            config.history_max_limit,
        );

        Self {
            pipeline,
            hub,
            history,
            config,
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health::check))
        // Producers
        .route("/chair", post(handlers::chair::push))
        .route("/posenet", post(handlers::posenet::push))
        // History
        .route("/api/history/:chair_id", get(handlers::history::list))
        // Live verdicts
        .route("/ws", get(handlers::live::upgrade))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use config::StorageBackend;
    use store::MemoryReadingStore;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_app() -> (Arc<MemoryReadingStore>, AppState, Router) {
        let store = Arc::new(MemoryReadingStore::new());
        let config = Config {
            storage_backend: StorageBackend::Memory,
            ..Config::default()
        };
        let state = AppState::new(store.clone(), config);
        let app = create_router(state.clone());
        (store, state, app)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (_, state, app) = test_app();
        let _sub = state.hub.subscribe();

        let (status, body) = send(&app, get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "Server is running");
        assert_eq!(body["storage"], "memory");
        assert_eq!(body["liveSubscribers"], 1);
        assert_eq!(body["verdictsBroadcast"], 0);
    }

    #[tokio::test]
    async fn test_chair_push_classifies_stores_and_broadcasts() {
        let (store, state, app) = test_app();
        let mut sub = state.hub.subscribe();

        let (status, body) = send(&app, post_json("/chair", json!({
            "id": "CHAIR01",
            "sensors": [{"value": 100}, {"value": 100}, {"value": 150}, {"value": 150}]
        }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Data received successfully");
        assert_eq!(body["postureStatus"], "good");
        assert_eq!(store.len(), 1);
        assert_eq!(sub.try_recv().unwrap().source_id, "CHAIR01");
    }

    #[tokio::test]
    async fn test_chair_push_with_three_sensors_is_rejected() {
        let (store, state, app) = test_app();
        let mut sub = state.hub.subscribe();

        let (status, body) = send(&app, post_json("/chair", json!({
            "id": "CHAIR01",
            "sensors": [{"value": 100}, {"value": 100}, {"value": 150}]
        }))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
        assert_eq!(store.append_calls(), 0);
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_chair_push_without_sensor_array_is_rejected() {
        let (store, _, app) = test_app();

        for payload in [json!({"id": "CHAIR01"}), json!({"id": "CHAIR01", "sensors": 42})] {
            let (status, body) = send(&app, post_json("/chair", payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "Invalid sensor data format");
        }
        assert_eq!(store.append_calls(), 0);
    }

    #[tokio::test]
    async fn test_chair_push_without_id_uses_unknown_source() {
        let (store, _, app) = test_app();

        let (status, _) = send(&app, post_json("/chair", json!({
            "sensors": [{"value": 0}, {"value": 0}, {"value": 0}, {"value": 0}]
        }))).await;
        assert_eq!(status, StatusCode::OK);

        let (_, history) = send(&app, get("/api/history/unknown")).await;
        assert_eq!(history[0]["postureStatus"], "not_sitting");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_source_id_falls_back_to_unknown() {
        let (store, _, app) = test_app();

        let (status, _) = send(&app, post_json("/chair", json!({
            "id": "",
            "sensors": [{"value": 50}, {"value": 50}, {"value": 50}, {"value": 50}]
        }))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, post_json("/posenet", json!({
            "chairId": "",
            "keypoints": []
        }))).await;
        assert_eq!(status, StatusCode::OK);

        let (_, history) = send(&app, get("/api/history/unknown?order=asc")).await;
        let statuses: Vec<&str> = history.as_array().unwrap()
            .iter()
            .map(|r| r["postureStatus"].as_str().unwrap())
            .collect();
        assert_eq!(statuses.len(), 2);
        assert!(statuses.contains(&"good"));
        assert!(statuses.contains(&"insufficient_data"));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_storage_outage_is_503() {
        let (store, _, app) = test_app();
        store.set_unavailable(true);

        let (status, _) = send(&app, post_json("/chair", json!({
            "id": "CHAIR01",
            "sensors": [{"value": 50}, {"value": 50}, {"value": 50}, {"value": 50}]
        }))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_posenet_push_with_missing_shoulder_is_stored() {
        let (store, _, app) = test_app();

        let (status, body) = send(&app, post_json("/posenet", json!({
            "chairId": "CHAIR01",
            "keypoints": [
                {"part": "nose", "position": {"x": 150, "y": 180}, "score": 0.9},
                {"part": "leftShoulder", "position": {"x": 200, "y": 200}, "score": 0.9}
            ]
        }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["postureStatus"], "insufficient_data");
        assert_eq!(store.len(), 1);

        let (status, body) = send(&app, post_json("/posenet", json!({"chairId": "CHAIR01"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid keypoints data");
    }

    #[tokio::test]
    async fn test_posenet_push_ignores_unlisted_parts() {
        let (store, _, app) = test_app();

        let (status, body) = send(&app, post_json("/posenet", json!({
            "chairId": "CHAIR01",
            "keypoints": [
                {"part": "nose", "position": {"x": 150, "y": 180}, "score": 0.9},
                {"part": "leftShoulder", "position": {"x": 200, "y": 200}, "score": 0.9},
                {"part": "rightShoulder", "position": {"x": 100, "y": 200}, "score": 0.9},
                {"part": "left_hip", "position": {"x": 190, "y": 400}, "score": 0.8}
            ]
        }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["postureStatus"], "good");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_history_rejects_malformed_query_as_json() {
        let (_, _, app) = test_app();

        for uri in [
            "/api/history/CHAIR01?limit=abc",
            "/api/history/CHAIR01?limit=-3",
            "/api/history/CHAIR01?order=sideways",
        ] {
            let (status, body) = send(&app, get(uri)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["status"], 400, "{}", uri);
            assert!(body["error"].is_string(), "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_history_window_and_order() {
        let (_, _, app) = test_app();

        for (ts, values) in [
            ("2024-03-09T12:00:00Z", [0, 0, 0, 0]),
            ("2024-03-10T09:00:00Z", [100, 100, 150, 150]),
            ("2024-03-10T18:00:00Z", [150, 150, 100, 100]),
            ("2024-03-11T08:00:00Z", [50, 50, 50, 50]),
        ] {
            let sensors: Vec<Value> = values.iter().map(|v| json!({"value": v})).collect();
            let (status, _) = send(&app, post_json("/chair", json!({
                "id": "CHAIR01",
                "sensors": sensors,
                "timestamp": ts
            }))).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = send(&app, get("/api/history/CHAIR01?from=2024-03-10&to=2024-03-10")).await;
        assert_eq!(status, StatusCode::OK);
        let records = body.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["postureStatus"], "leaning_forward");
        assert_eq!(records[0]["sourceId"], "CHAIR01");
        assert!(records[0].get("poseData").is_none());

        let (_, body) = send(&app, get("/api/history/CHAIR01?order=asc&limit=2")).await;
        let statuses: Vec<&str> = body.as_array().unwrap()
            .iter()
            .map(|r| r["postureStatus"].as_str().unwrap())
            .collect();
        assert_eq!(statuses, vec!["leaning_forward", "good"]);

        let (status, _) = send(&app, get("/api/history/CHAIR01?from=yesterday")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, get("/api/history/CHAIR01?limit=0")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
