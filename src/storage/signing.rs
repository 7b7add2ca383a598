use crate::{context::Secret, error::AppError};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Format required for the `x-ms-date` header.
pub const MS_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Computes the `Authorization` value for an Azure Storage Shared Key request
/// without body-related headers (GET/HEAD).
///
/// `ms_headers` are the `x-ms-*` headers sent with the request;
/// `canonical_resource` is `/{account}{url path}`.
pub fn shared_key_authorization(
    method: &str,
    account_name: &str,
    account_key: &Secret,
    ms_headers: &[(&str, &str)],
    canonical_resource: &str,
) -> Result<String, AppError> {
    let mut canonical_headers: Vec<(String, &str)> = ms_headers
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value.trim()))
        .collect();
    canonical_headers.sort_by(|a, b| a.0.cmp(&b.0));

    let canonical_headers = canonical_headers
        .iter()
        .map(|(name, value)| format!("{}:{}", name, value))
        .collect::<Vec<_>>()
        .join("\n");

    // Eleven standard header fields follow the verb; all empty here.
    let string_to_sign = format!(
        "{}\n\n\n\n\n\n\n\n\n\n\n\n{}\n{}",
        method, canonical_headers, canonical_resource
    );
    debug!(resource = canonical_resource, "Signing blob store request");

    let key_bytes = BASE64
        .decode(account_key.expose())
        .map_err(|_| AppError::InvalidAccountKey)?;
    let mut mac = HmacSha256::new_from_slice(&key_bytes).map_err(|_| AppError::InvalidAccountKey)?;
    mac.update(string_to_sign.as_bytes());
    let signature = BASE64.encode(mac.finalize().into_bytes());

    Ok(format!("SharedKey {}:{}", account_name, signature))
}
