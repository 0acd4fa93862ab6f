use crate::connection::ConnectionState;
use axum::body::Body;
use axum::http::Request;
use axum::{Router, routing::get};
use tokio::sync::watch;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub mod health;
pub mod middleware;

/// Application state for the HTTP surface.
///
/// Owns a subscription to the connection state rather than reaching into any
/// ambient global; the liveness route only reads it for diagnostics.
#[derive(Clone, Debug)]
pub struct AppState {
    pub connection: watch::Receiver<ConnectionState>,
}

/// Configures and returns the application router.
///
/// The surface is deliberately a single route; everything else falls through
/// to axum's default 404/405 handling.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root))
        .layer(PropagateRequestIdLayer::new(axum::http::HeaderName::from_static("x-request-id")))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(move |request: &Request<Body>| {
                    let request_id = request
                        .extensions()
                        .get::<tower_http::request_id::RequestId>()
                        .map(|id| id.header_value().to_str().unwrap_or_default())
                        .unwrap_or_default()
                        .to_string();

                    tracing::info_span!(
                        "request",
                        "request_id" = %request_id,
                        "http.request.method" = %request.method(),
                        "url.path" = %request.uri().path(),
                        "http.response.status_code" = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, _span: &tracing::Span| {
                        let status = response.status();
                        tracing::Span::current().record("http.response.status_code", status.as_u16());

                        tracing::info!(
                            latency_ms = %latency.as_millis(),
                            status = %status.as_u16(),
                            "request completed"
                        );
                    },
                ),
        )
        .layer(SetRequestIdLayer::new(
            axum::http::HeaderName::from_static("x-request-id"),
            middleware::MakeRequestUuidOrHeader,
        ))
        .with_state(state)
}
