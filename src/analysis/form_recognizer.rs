use super::{AnalysisOutcome, AnalysisService};
use crate::{context::AnalysisTarget, error::AppError, storage::BlobPayload};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use tracing::{debug, error, info, warn};

const SUBSCRIPTION_KEY_HEADER: &str = "ocp-apim-subscription-key";
const ANALYZE_PATH: &str = "/formrecognizer/v1.0-preview/custom/models/{model_id}/analyze";

/// Client for Form Recognizer v1.0-preview custom models.
pub struct FormRecognizerClient {
    client: reqwest::Client,
    endpoint_template: String,
}

impl FormRecognizerClient {
    pub fn new(client: reqwest::Client, endpoint_template: String) -> Self {
        Self {
            client,
            endpoint_template,
        }
    }

    pub fn analyze_url(&self, target: &AnalysisTarget<'_>) -> Result<String, AppError> {
        if target.region.is_empty()
            || !target
                .region
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        {
            return Err(AppError::InvalidHeader("region"));
        }
        if !target
            .model_id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-')
        {
            return Err(AppError::InvalidHeader("model_id"));
        }

        let host = self.endpoint_template.replace("{region}", target.region);
        let path = ANALYZE_PATH.replace("{model_id}", target.model_id);
        Ok(format!("{}{}", host.trim_end_matches('/'), path))
    }

    fn headers(&self, target: &AnalysisTarget<'_>, content_type: &str) -> Result<HeaderMap, AppError> {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_str(content_type).map_err(|_| AppError::InvalidHeader("content_type"))?,
        );

        match target.subscription_key {
            Some(key) => {
                let mut value = HeaderValue::from_str(key.expose())
                    .map_err(|_| AppError::InvalidHeader("subscription_key"))?;
                value.set_sensitive(true);
                headers.insert(SUBSCRIPTION_KEY_HEADER, value);
            }
            None => warn!("No subscription key supplied, analysis request will be unauthenticated"),
        }

        Ok(headers)
    }
}

#[async_trait]
impl AnalysisService for FormRecognizerClient {
    fn name(&self) -> &str {
        "form-recognizer"
    }

    async fn analyze(
        &self,
        target: &AnalysisTarget<'_>,
        content_type: &str,
        payload: &BlobPayload,
    ) -> Result<AnalysisOutcome, AppError> {
        let url = self.analyze_url(target)?;
        let headers = self.headers(target, content_type)?;
        debug!(url = %url, size = payload.content.len(), "Submitting document for analysis");

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .body(payload.content.clone())
            .send()
            .await
            .map_err(|e| {
                error!(model_id = target.model_id, "Analysis service unreachable: {}", e);
                AppError::AnalysisUnavailable(e)
            })?;

        let status = response.status().as_u16();
        let raw = response.bytes().await.map_err(AppError::AnalysisUnavailable)?;
        let body = serde_json::from_slice::<Value>(&raw)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&raw).into_owned()));

        let outcome = AnalysisOutcome { status, body };
        if outcome.is_success() {
            info!(model_id = target.model_id, status, response = %outcome.body, "Analysis completed");
        } else {
            warn!(model_id = target.model_id, status, response = %outcome.body, "Analysis service returned non-success status");
        }

        Ok(outcome)
    }
}
