use super::{metrics::MetricsRegistry, RelayOutcome, RequestMetrics};
use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{header::CONTENT_LENGTH, HeaderValue, Request, Response},
    middleware::Next,
};
use std::time::Instant;
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Tags each request with an id, times it and records its metrics once the
/// response body is known.
pub async fn metrics_middleware(
    State(registry): State<MetricsRegistry>,
    req: Request<Body>,
    next: Next,
) -> Response<Body> {
    let start = Instant::now();
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let path = req.uri().path().to_string();
    let method = req.method().to_string();
    let request_size = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);

    let span = info_span!("request", request_id = %request_id, method = %method, path = %path);
    let response = next.run(req).instrument(span).await;

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to buffer response body for metrics: {}", e);
            Default::default()
        }
    };
    debug!("Response body size: {} bytes", bytes.len());

    let outcome = parts
        .extensions
        .remove::<RelayOutcome>()
        .unwrap_or_default();

    let metrics = RequestMetrics {
        request_id: request_id.clone(),
        path,
        method,
        total_latency: start.elapsed(),
        request_size,
        response_size: bytes.len(),
        status_code: parts.status.as_u16(),
        content_type: outcome.content_type,
        analyzed: outcome.analysis_status.is_some(),
        analysis_status_code: outcome.analysis_status,
    };
    registry.record_metrics(metrics).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        parts.headers.insert(REQUEST_ID_HEADER, value);
    }

    Response::from_parts(parts, Body::from(bytes))
}
