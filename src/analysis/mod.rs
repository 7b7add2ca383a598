use crate::{context::AnalysisTarget, error::AppError, storage::BlobPayload};
use async_trait::async_trait;

mod form_recognizer;

pub use form_recognizer::FormRecognizerClient;

/// Content types the analysis service accepts.
pub const SUPPORTED_CONTENT_TYPES: [&str; 3] = ["application/pdf", "image/jpeg", "image/png"];

/// Exact match, no parameter or case normalization.
pub fn is_supported(content_type: &str) -> bool {
    SUPPORTED_CONTENT_TYPES.contains(&content_type)
}

/// What came back from the analysis service. Kept for logging and telemetry
/// only; it is never returned to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub status: u16,
    pub body: serde_json::Value,
}

impl AnalysisOutcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Get the service's name for logging
    fn name(&self) -> &str;

    /// Submit the document bytes to the target model.
    ///
    /// Only transport failures are errors; a non-success HTTP status is
    /// reported through the outcome.
    async fn analyze(
        &self,
        target: &AnalysisTarget<'_>,
        content_type: &str,
        payload: &BlobPayload,
    ) -> Result<AnalysisOutcome, AppError>;
}
