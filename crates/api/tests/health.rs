mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, get, header};
use tablebuilder_db::local::MemoryKvStore;

#[tokio::test]
async fn health_is_ok_on_local_tier_only() {
    let app = common::build_test_app();

    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(header(&response, "x-request-id").is_some());

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["remote_configured"], false);
    assert_eq!(json["remote_healthy"], false);
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn unreachable_remote_reports_degraded() {
    let app = common::build_app_with(
        common::test_config(),
        Some(common::unreachable_pool()),
        Arc::new(MemoryKvStore::new()),
    );

    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["remote_configured"], true);
    assert_eq!(json["remote_healthy"], false);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = common::build_test_app();
    let response = get(&app, "/api/v1/nonexistent").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
