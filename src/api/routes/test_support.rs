//! Helpers shared by the route tests.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::util::ServiceExt;

use crate::api::state::AppState;
use crate::models::PlayerRecord;
use crate::storage::StorageConfig;
use crate::tracker::{Tracker, TrackerOptions};

pub const MATCH_HEADER: &str =
    "Match ID,Jersey No,Reg No,Score,Runner Rounds,Runout (F),Catch,Assist,Errors,Runout (R)";

pub fn setup_state(dir: &std::path::Path, players: Vec<PlayerRecord>) -> AppState {
    let mut tracker = Tracker::with_storage(
        StorageConfig::new(dir.to_path_buf()),
        TrackerOptions {
            persist_history: false,
            ..TrackerOptions::default()
        },
    )
    .unwrap();
    if !players.is_empty() {
        tracker.register_players(players).unwrap();
    }
    AppState::new(tracker)
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(request).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

pub async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_body(
    app: axum::Router,
    uri: &str,
    content_type: &str,
    body: &str,
) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", content_type)
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn post_empty(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}
