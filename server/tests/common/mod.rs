#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use golinks::{app, snapshot::SnapshotFile, store::LinkStore, AppState};
use std::{path::Path, sync::Arc};
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub dir: TempDir,
}

/// Fresh app with an empty table, persisting into a temporary directory.
pub fn test_app() -> TestApp {
    let dir = TempDir::new().unwrap();
    let snapshot = SnapshotFile::new(dir.path().join("links.json"));
    app_with_snapshot(snapshot, dir)
}

pub fn app_with_snapshot(snapshot: SnapshotFile, dir: TempDir) -> TestApp {
    let state = AppState::new(LinkStore::new(), snapshot);
    TestApp {
        router: app(state.clone()),
        state,
        dir,
    }
}

pub async fn send(router: &Router, method: &str, uri: &str) -> Response<Body> {
    router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn get(router: &Router, uri: &str) -> Response<Body> {
    send(router, "GET", uri).await
}

pub fn location(response: &Response<Body>) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

pub fn assert_found(response: &Response<Body>, expected: &str) {
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(response), expected);
}

pub fn read_snapshot(path: &Path) -> serde_json::Value {
    let data = std::fs::read(path).unwrap();
    serde_json::from_slice(&data).unwrap()
}
