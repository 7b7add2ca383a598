use crate::error::AppError;
use std::time::Duration;

/// Builds the pooled HTTP client shared by both upstream collaborators.
///
/// `timeout` bounds every outbound call end to end.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .pool_idle_timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(32)
        .tcp_keepalive(Duration::from_secs(60))
        .connect_timeout(Duration::from_secs(3).min(timeout))
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))
}
