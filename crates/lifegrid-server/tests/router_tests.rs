//! Integration tests for HTTP routing.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server.

#![allow(clippy::unwrap_used)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use lifegrid_server::{AppState, build_router};
use tower::ServiceExt;

const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/static");

fn make_router() -> axum::Router {
    build_router(Arc::new(AppState::default()), Path::new(STATIC_DIR))
}

#[tokio::test]
async fn test_index_serves_frontend() {
    let response = make_router()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    assert!(content_type.contains("text/html"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(body.contains("gameCanvas"));
}

#[tokio::test]
async fn test_missing_asset_is_not_found() {
    let response = make_router()
        .oneshot(Request::get("/script.js").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ws_requires_upgrade() {
    let response = make_router()
        .oneshot(Request::get("/ws").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}
