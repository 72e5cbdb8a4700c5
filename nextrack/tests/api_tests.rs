//! Integration tests for the nextrack API endpoints
//!
//! Drives the full router over an in-memory store: hello/health, track
//! metadata lookup, the recommendation endpoint (both experiment arms
//! resolve to a catalog track), input validation, and the data log.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use nextrack::config::ServiceConfig;
use nextrack::datalog::DataLogger;
use nextrack::ingest;
use nextrack::{build_recommenders, build_router, AppState, TRACKS_NAMESPACE};
use nextrack_common::catalog::{Catalog, Track};
use nextrack_common::store::{KvStore, MemoryStore, ModelStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

const CATALOG_IDS: [i64; 4] = [11, 22, 33, 44];

/// Test helper: full app over an in-memory store with a small catalog.
/// The TempDir holds the data log and must outlive the router.
async fn setup_app() -> (axum::Router, TempDir) {
    let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());

    let catalog = Arc::new(Catalog::from_tracks(
        CATALOG_IDS
            .iter()
            .map(|&id| Track {
                track: id,
                artist: format!("artist-{}", id),
                title: format!("title-{}", id),
            })
            .collect(),
    ));

    ingest::upload_tracks(&catalog, &ModelStore::new(store.clone(), TRACKS_NAMESPACE))
        .await
        .unwrap();

    let (session, control) = build_recommenders(
        store.clone(),
        &catalog,
        vec![11, 22],
        ServiceConfig::default().dionis,
    )
    .unwrap();

    let dir = TempDir::new().unwrap();
    let data_logger = Arc::new(
        DataLogger::open(&dir.path().join("requests.log"))
            .await
            .unwrap(),
    );

    let state = AppState {
        tracks: ModelStore::new(store, TRACKS_NAMESPACE),
        session,
        control,
        data_logger,
    };
    (build_router(state), dir)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

#[tokio::test]
async fn test_hello() {
    let (app, _dir) = setup_app().await;

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_health() {
    let (app, _dir) = setup_app().await;

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "nextrack");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_get_track() {
    let (app, _dir) = setup_app().await;

    let response = app.oneshot(get("/track/22")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["track"], 22);
    assert_eq!(body["artist"], "artist-22");
    assert_eq!(body["title"], "title-22");
}

#[tokio::test]
async fn test_get_track_not_found() {
    let (app, _dir) = setup_app().await;

    let response = app.oneshot(get("/track/999")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("999"));
}

#[tokio::test]
async fn test_next_returns_catalog_track() {
    let (app, _dir) = setup_app().await;

    // With no model data every chain bottoms out in Random over the
    // catalog, for either experiment arm.
    for user in 0..10 {
        let request = post_json(&format!("/next/{}", user), json!({"track": 11, "time": 0.7}));
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = extract_json(response.into_body()).await;
        assert_eq!(body["user"], user);
        let track = body["track"].as_i64().unwrap();
        assert!(CATALOG_IDS.contains(&track), "unexpected track {}", track);
    }
}

#[tokio::test]
async fn test_next_rejects_negative_time() {
    let (app, _dir) = setup_app().await;

    let request = post_json("/next/1", json!({"track": 11, "time": -0.5}));
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("time"));
}

#[tokio::test]
async fn test_next_rejects_missing_fields() {
    let (app, _dir) = setup_app().await;

    let request = post_json("/next/1", json!({"track": 11}));
    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_last_logs_and_acks() {
    let (app, dir) = setup_app().await;

    let request = post_json("/last/5", json!({"track": 33, "time": 0.9}));
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["user"], 5);

    let log = std::fs::read_to_string(dir.path().join("requests.log")).unwrap();
    let entry: Value = serde_json::from_str(log.lines().next().unwrap()).unwrap();
    assert_eq!(entry["event"], "last");
    assert_eq!(entry["user"], 5);
    assert_eq!(entry["track"], 33);
}

#[tokio::test]
async fn test_next_writes_data_log() {
    let (app, dir) = setup_app().await;

    let request = post_json("/next/7", json!({"track": 44, "time": 0.2}));
    app.oneshot(request).await.unwrap();

    let log = std::fs::read_to_string(dir.path().join("requests.log")).unwrap();
    let entry: Value = serde_json::from_str(log.lines().next().unwrap()).unwrap();
    assert_eq!(entry["event"], "next");
    assert_eq!(entry["user"], 7);
    assert!(entry["recommendation"].is_i64());
}
