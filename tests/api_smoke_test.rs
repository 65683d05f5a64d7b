//! Service-level probes: the root banner, health check, and status report.

mod common;

use axum::{
    body::to_bytes,
    http::{Method, StatusCode},
};
use common::{read_json, TestApp};

#[tokio::test]
async fn root_serves_the_banner() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"tanepro-api up");
}

#[tokio::test]
async fn health_check_reports_the_database() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["checks"]["database"], "healthy");
}

#[tokio::test]
async fn status_endpoint_names_the_service() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/v1/status", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["data"]["service"], "tanepro-api");
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["environment"], "test");
    assert!(!body["data"]["version"].as_str().unwrap().is_empty());
}
