//! # HTTP Metrics
//!
//! Request metrics recorded through the `metrics` facade and exported by
//! the Prometheus recorder installed in `main`:
//!
//! | Metric                                   | Kind      | Labels                 |
//! |------------------------------------------|-----------|------------------------|
//! | `homenest_http_requests_total`           | counter   | method, path, status   |
//! | `homenest_http_request_duration_seconds` | histogram | method, path, status   |
//! | `homenest_http_errors_total`             | counter   | method, path, status   |
//!
//! The `path` label is the matched route template (`/properties/{id}`),
//! never the raw URI. Requests that match no route share the
//! [`UNMATCHED_PATH`] label, so label cardinality is bounded by the router.

use std::time::{Duration, Instant};

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

pub const HTTP_REQUESTS_TOTAL: &str = "homenest_http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "homenest_http_request_duration_seconds";
pub const HTTP_ERRORS_TOTAL: &str = "homenest_http_errors_total";

/// Path label for requests that fell through to the fallback.
pub const UNMATCHED_PATH: &str = "unmatched";

const DURATION_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Recorder builder with the request-duration buckets configured.
pub fn prometheus_builder() -> Result<PrometheusBuilder, BuildError> {
    PrometheusBuilder::new().set_buckets_for_metric(
        Matcher::Full(HTTP_REQUEST_DURATION_SECONDS.to_string()),
        &DURATION_BUCKETS,
    )
}

/// Install the global Prometheus recorder. Call once, at startup.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    prometheus_builder()?.install_recorder()
}

/// The route template a request matched, or [`UNMATCHED_PATH`].
pub fn route_label(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_PATH.to_string())
}

/// Record one completed request.
pub fn record_request(method: &str, path: &str, status: u16, elapsed: Duration) {
    let method = method.to_string();
    let path = path.to_string();
    let status = status.to_string();

    metrics::counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.clone()
    )
    .increment(1);

    metrics::histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.clone()
    )
    .record(elapsed.as_secs_f64());

    if status.starts_with('4') || status.starts_with('5') {
        metrics::counter!(
            HTTP_ERRORS_TOTAL,
            "method" => method,
            "path" => path,
            "status" => status
        )
        .increment(1);
    }
}

/// Axum middleware that records request count, latency and errors.
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = route_label(&request);
    let start = Instant::now();

    let response = next.run(request).await;

    record_request(
        method.as_str(),
        &path,
        response.status().as_u16(),
        start.elapsed(),
    );
    response
}
