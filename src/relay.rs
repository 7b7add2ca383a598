use crate::{
    analysis::{is_supported, AnalysisOutcome, AnalysisService},
    context::RequestContext,
    error::AppError,
    storage::BlobStore,
};
use serde::Serialize;
use tracing::{debug, info};

/// Stands in for the storage account key in responses.
pub const ACCOUNT_KEY_PLACEHOLDER: &str = "YOUR_SECRET_ACCOUNT_KEY";

/// Status summary returned to the caller. Field order is the wire order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelayResponse {
    pub account_name: Option<String>,
    pub account_key: Option<&'static str>,
    pub blob_name: Option<String>,
    pub content_type: Option<String>,
}

impl RelayResponse {
    pub fn new(ctx: &RequestContext, content_type: Option<String>) -> Self {
        Self {
            account_name: ctx.storage_account_name.clone(),
            account_key: ctx
                .storage_account_key
                .as_ref()
                .map(|_| ACCOUNT_KEY_PLACEHOLDER),
            blob_name: ctx.blob_name.clone(),
            content_type,
        }
    }
}

/// Result of one relay pass; the outcome is present only when the document
/// was submitted for analysis.
#[derive(Debug, Clone)]
pub struct RelayReport {
    pub response: RelayResponse,
    pub analysis: Option<AnalysisOutcome>,
}

/// Fetches the blob named by `ctx` and submits it for analysis when its
/// content type is supported.
///
/// Blob store failures abort the request. The analysis response is logged by
/// the service client and otherwise ignored, whatever its status.
pub async fn analyze_form(
    blob_store: &dyn BlobStore,
    analysis: &dyn AnalysisService,
    ctx: &RequestContext,
) -> Result<RelayReport, AppError> {
    let location = ctx.blob_location()?;
    debug!(
        store = blob_store.name(),
        container = location.container_name,
        blob = location.blob_name,
        "Fetching blob"
    );
    let payload = blob_store.get_blob(&location).await?;

    let outcome = match payload.content_type.as_deref() {
        Some(content_type) if is_supported(content_type) => {
            let target = ctx.analysis_target()?;
            debug!(service = analysis.name(), content_type, "Relaying blob for analysis");
            Some(analysis.analyze(&target, content_type, &payload).await?)
        }
        other => {
            info!(
                content_type = other.unwrap_or("none"),
                "Unsupported content type, skipping analysis"
            );
            None
        }
    };

    Ok(RelayReport {
        response: RelayResponse::new(ctx, payload.content_type),
        analysis: outcome,
    })
}
