#![allow(clippy::unwrap_used, clippy::panic, clippy::missing_panics_doc)]

use axum::http::StatusCode;
use k8s_demo_server::connection::ConnectionState;

mod common;

#[tokio::test]
async fn test_root_returns_liveness_body() {
    let app = common::TestApp::spawn().await;

    let resp = app.client.get(format!("{}/", app.base_url)).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "Node K8s App running!");
}

#[tokio::test]
async fn test_root_is_independent_of_connection_state() {
    let app = common::TestApp::spawn().await;

    // Walk the connection through its lifecycle; the liveness body must not
    // change regardless of database health.
    for state in [
        ConnectionState::Connecting,
        ConnectionState::Errored,
        ConnectionState::Connected,
        ConnectionState::Disconnected,
    ] {
        app.monitor.transition(state);

        let resp = app.client.get(format!("{}/", app.base_url)).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "state {state:?} changed the response");
        assert_eq!(resp.text().await.unwrap(), "Node K8s App running!");
    }
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = common::TestApp::spawn().await;

    let resp = app.client.get(format!("{}/metrics", app.base_url)).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_get_method_is_rejected() {
    let app = common::TestApp::spawn().await;

    let resp = app.client.post(format!("{}/", app.base_url)).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_request_id_header_is_set() {
    let app = common::TestApp::spawn().await;

    let resp = app.client.get(format!("{}/", app.base_url)).send().await.unwrap();
    assert!(resp.headers().contains_key("x-request-id"));

    let resp = app
        .client
        .get(format!("{}/", app.base_url))
        .header("x-request-id", "caller-supplied")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "caller-supplied");
}
