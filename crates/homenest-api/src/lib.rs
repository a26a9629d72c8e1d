//! # homenest-api: HTTP API for HomeNest
//!
//! Property listings and reviews over a [`homenest_store::DocumentStore`].
//!
//! ## API Surface
//!
//! | Method | Path                | Module                 | Guarded |
//! |--------|---------------------|------------------------|---------|
//! | POST   | `/properties`       | [`routes::properties`] | yes     |
//! | GET    | `/properties`       | [`routes::properties`] | no      |
//! | GET    | `/properties/{id}`  | [`routes::properties`] | no      |
//! | PUT    | `/properties/{id}`  | [`routes::properties`] | no      |
//! | DELETE | `/properties/{id}`  | [`routes::properties`] | no      |
//! | POST   | `/reviews`          | [`routes::reviews`]    | no      |
//! | GET    | `/reviews`          | [`routes::reviews`]    | no      |
//!
//! Plus `/` (greeting), `/health/liveness`, `/health/readiness`,
//! `/metrics` (when enabled) and `/openapi.json`.
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! CorsLayer → TraceLayer → MetricsMiddleware → [AccessGuard] → Handler
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

use crate::error::ErrorBody;
pub use crate::state::AppState;

/// Greeting served at `/`.
pub const GREETING: &str = "Hello HomeNest!";

/// Assemble the full application router with all routes and middleware.
///
/// `/metrics` and the metrics middleware are mounted only when the state
/// carries a Prometheus handle.
pub fn app(state: AppState) -> Router {
    let metrics_on = state.metrics.is_some();

    let mut router = Router::new()
        .route("/", get(root))
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .merge(routes::properties::router(state.clone()))
        .merge(routes::reviews::router())
        .merge(openapi::router());

    if metrics_on {
        router = router.route("/metrics", get(prometheus_metrics));
    }

    let mut router = router.fallback(route_not_found);

    if metrics_on {
        router = router.layer(from_fn(middleware::metrics::track_metrics));
    }

    router
        .layer(middleware::tracing_layer::layer())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> &'static str {
    GREETING
}

/// Liveness probe. Never touches the store.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe. Returns 200 "ready" or 503 when the store is unreachable.
async fn readiness(State(state): State<AppState>) -> Response {
    match state.store.ping().await {
        Ok(()) => "ready".into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "store health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "store unreachable").into_response()
        }
    }
}

/// GET /metrics: Prometheus text exposition.
async fn prometheus_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn route_not_found() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::message("Route not found")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn root_greets() {
        let (status, body) = get_text(app(AppState::in_memory()), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Hello HomeNest!");
    }

    #[tokio::test]
    async fn probes() {
        let (status, body) = get_text(app(AppState::in_memory()), "/health/liveness").await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "ok"));

        let (status, body) = get_text(app(AppState::in_memory()), "/health/readiness").await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "ready"));
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let (status, body) = get_text(app(AppState::in_memory()), "/nowhere").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, r#"{"message":"Route not found"}"#);
    }

    #[tokio::test]
    async fn metrics_route_absent_without_handle() {
        let (status, _) = get_text(app(AppState::in_memory()), "/metrics").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn metrics_route_renders_with_handle() {
        let recorder = middleware::metrics::prometheus_builder()
            .unwrap()
            .build_recorder();
        let state = AppState::in_memory().with_metrics(recorder.handle());
        let (status, _) = get_text(app(state), "/metrics").await;
        assert_eq!(status, StatusCode::OK);
    }
}
