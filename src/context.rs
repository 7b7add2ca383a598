use crate::error::AppError;
use axum::http::HeaderMap;
use std::fmt;

pub const STORAGE_ACCOUNT_NAME: &str = "storage_account_name";
pub const STORAGE_ACCOUNT_KEY: &str = "storage_account_key";
pub const CONTAINER_NAME: &str = "container_name";
pub const BLOB_NAME: &str = "blob_name";
pub const REGION: &str = "region";
pub const MODEL_ID: &str = "model_id";
pub const SUBSCRIPTION_KEY: &str = "subscription_key";

/// A credential that must not show up in logs or responses.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(REDACTED)")
    }
}

/// Per-request settings taken from the inbound headers.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub storage_account_name: Option<String>,
    pub storage_account_key: Option<Secret>,
    pub container_name: Option<String>,
    pub blob_name: Option<String>,
    pub region: Option<String>,
    pub model_id: Option<String>,
    pub subscription_key: Option<Secret>,
}

/// Where a blob lives and how to authenticate against its account.
#[derive(Debug, Clone)]
pub struct BlobLocation<'a> {
    pub account_name: &'a str,
    /// `None` means anonymous access to a public container.
    pub account_key: Option<&'a Secret>,
    pub container_name: &'a str,
    pub blob_name: &'a str,
}

/// The custom model a document is submitted to.
#[derive(Debug, Clone)]
pub struct AnalysisTarget<'a> {
    pub region: &'a str,
    pub model_id: &'a str,
    pub subscription_key: Option<&'a Secret>,
}

impl RequestContext {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            storage_account_name: header_value(headers, STORAGE_ACCOUNT_NAME),
            storage_account_key: header_value(headers, STORAGE_ACCOUNT_KEY).map(Secret),
            container_name: header_value(headers, CONTAINER_NAME),
            blob_name: header_value(headers, BLOB_NAME),
            region: header_value(headers, REGION),
            model_id: header_value(headers, MODEL_ID),
            subscription_key: header_value(headers, SUBSCRIPTION_KEY).map(Secret),
        }
    }

    pub fn blob_location(&self) -> Result<BlobLocation<'_>, AppError> {
        Ok(BlobLocation {
            account_name: required(&self.storage_account_name, STORAGE_ACCOUNT_NAME)?,
            account_key: self.storage_account_key.as_ref(),
            container_name: required(&self.container_name, CONTAINER_NAME)?,
            blob_name: required(&self.blob_name, BLOB_NAME)?,
        })
    }

    pub fn analysis_target(&self) -> Result<AnalysisTarget<'_>, AppError> {
        Ok(AnalysisTarget {
            region: required(&self.region, REGION)?,
            model_id: required(&self.model_id, MODEL_ID)?,
            subscription_key: self.subscription_key.as_ref(),
        })
    }
}

// Empty values count as absent.
fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, AppError> {
    value.as_deref().ok_or(AppError::MissingHeader(name))
}
