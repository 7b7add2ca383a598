use super::{signing, BlobPayload, BlobStore};
use crate::{context::BlobLocation, error::AppError};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header, StatusCode, Url};
use tracing::{debug, error, info};

/// Reads blobs over the Azure Blob Storage REST API.
pub struct AzureBlobStore {
    client: reqwest::Client,
    endpoint_template: String,
    api_version: String,
}

impl AzureBlobStore {
    pub fn new(client: reqwest::Client, endpoint_template: String, api_version: String) -> Self {
        Self {
            client,
            endpoint_template,
            api_version,
        }
    }

    fn blob_url(&self, location: &BlobLocation<'_>) -> Result<Url, AppError> {
        if !is_valid_account_name(location.account_name) {
            return Err(AppError::InvalidHeader("storage_account_name"));
        }
        if location
            .blob_name
            .split('/')
            .any(|segment| segment == "." || segment == "..")
        {
            return Err(AppError::InvalidHeader("blob_name"));
        }

        let base = self
            .endpoint_template
            .replace("{account}", location.account_name);
        let mut url = Url::parse(&base).map_err(|_| AppError::InvalidHeader("storage_account_name"))?;

        url.path_segments_mut()
            .map_err(|_| AppError::InvalidHeader("storage_account_name"))?
            .pop_if_empty()
            .push(location.container_name)
            .extend(location.blob_name.split('/'));

        Ok(url)
    }
}

/// Storage account names are 3-24 lowercase letters or digits.
fn is_valid_account_name(name: &str) -> bool {
    (3..=24).contains(&name.len())
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

#[async_trait]
impl BlobStore for AzureBlobStore {
    fn name(&self) -> &str {
        "azure-blob"
    }

    async fn get_blob(&self, location: &BlobLocation<'_>) -> Result<BlobPayload, AppError> {
        let url = self.blob_url(location)?;
        let date = Utc::now().format(signing::MS_DATE_FORMAT).to_string();

        let mut request = self
            .client
            .get(url.clone())
            .header("x-ms-date", &date)
            .header("x-ms-version", &self.api_version);

        if let Some(key) = location.account_key {
            let resource = format!("/{}{}", location.account_name, url.path());
            let authorization = signing::shared_key_authorization(
                "GET",
                location.account_name,
                key,
                &[("x-ms-date", date.as_str()), ("x-ms-version", self.api_version.as_str())],
                &resource,
            )?;
            request = request.header(header::AUTHORIZATION, authorization);
        } else {
            debug!("No account key supplied, reading blob anonymously");
        }

        let response = request.send().await.map_err(|e| {
            error!(
                container = location.container_name,
                blob = location.blob_name,
                "Blob store unreachable: {}",
                e
            );
            AppError::BlobStoreUnavailable(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(
                container = location.container_name,
                blob = location.blob_name,
                status = status.as_u16(),
                "Blob store rejected request"
            );
            return Err(match status {
                StatusCode::NOT_FOUND => AppError::BlobNotFound {
                    container: location.container_name.to_string(),
                    blob: location.blob_name.to_string(),
                },
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    AppError::BlobAuthFailed(status.as_u16())
                }
                other => AppError::BlobStore(other.as_u16()),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let content = response
            .bytes()
            .await
            .map_err(AppError::BlobStoreUnavailable)?;

        info!(
            container = location.container_name,
            blob = location.blob_name,
            size = content.len(),
            content_type = content_type.as_deref().unwrap_or("none"),
            "Fetched blob"
        );

        Ok(BlobPayload {
            content,
            content_type,
        })
    }
}
