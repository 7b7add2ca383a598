use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::io;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing required header: {0}")]
    MissingHeader(&'static str),

    #[error("Invalid header value for {0}")]
    InvalidHeader(&'static str),

    #[error("Storage account key is not valid base64")]
    InvalidAccountKey,

    #[error("Blob {container}/{blob} not found")]
    BlobNotFound { container: String, blob: String },

    #[error("Blob store rejected credentials with status {0}")]
    BlobAuthFailed(u16),

    #[error("Blob store returned status {0}")]
    BlobStore(u16),

    #[error("Blob store request failed: {0}")]
    BlobStoreUnavailable(#[source] reqwest::Error),

    #[error("Analysis service request failed: {0}")]
    AnalysisUnavailable(#[source] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl AppError {
    /// Stable machine-readable code reported in the error body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::MissingHeader(_) => "missing_header",
            AppError::InvalidHeader(_) => "invalid_header",
            AppError::InvalidAccountKey => "invalid_account_key",
            AppError::BlobNotFound { .. } => "blob_not_found",
            AppError::BlobAuthFailed(_) => "blob_auth_failed",
            AppError::BlobStore(_) => "blob_store_error",
            AppError::BlobStoreUnavailable(_) => "blob_store_unavailable",
            AppError::AnalysisUnavailable(_) => "analysis_unavailable",
            AppError::Config(_) => "config_error",
            AppError::IoError(_) => "io_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingHeader(_)
            | AppError::InvalidHeader(_)
            | AppError::InvalidAccountKey => StatusCode::BAD_REQUEST,
            AppError::BlobNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::BlobAuthFailed(_) => StatusCode::FORBIDDEN,
            AppError::BlobStore(_)
            | AppError::BlobStoreUnavailable(_)
            | AppError::AnalysisUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) | AppError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        }));

        (self.status(), body).into_response()
    }
}
