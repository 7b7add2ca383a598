use crate::{
    context::RequestContext,
    relay,
    startup::AppState,
    telemetry::RelayOutcome,
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

pub async fn analyze_form(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = RequestContext::from_headers(&headers);

    match relay::analyze_form(state.blob_store.as_ref(), state.analysis.as_ref(), &ctx).await {
        Ok(report) => {
            let outcome = RelayOutcome {
                content_type: report.response.content_type.clone(),
                analysis_status: report.analysis.as_ref().map(|o| o.status),
            };
            let mut response = Json(report.response).into_response();
            response.extensions_mut().insert(outcome);
            response
        }
        Err(e) => {
            tracing::error!(code = e.code(), "Relay error: {}", e);
            e.into_response()
        }
    }
}
