use crate::{context::BlobLocation, error::AppError};
use async_trait::async_trait;
use bytes::Bytes;

mod azure;
pub mod signing;

pub use azure::AzureBlobStore;

/// A blob read from storage, valid for a single request.
#[derive(Debug, Clone)]
pub struct BlobPayload {
    pub content: Bytes,
    /// Declared content type from the blob's properties, if any.
    pub content_type: Option<String>,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Get the store's name for logging
    fn name(&self) -> &str;

    /// Fetch the blob bytes together with their declared content type
    async fn get_blob(&self, location: &BlobLocation<'_>) -> Result<BlobPayload, AppError>;
}
