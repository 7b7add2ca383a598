use crate::error::AppError;
use dotenv::dotenv;
use std::{env, str::FromStr, time::Duration};

pub const DEFAULT_BLOB_ENDPOINT: &str = "https://{account}.blob.core.windows.net";
pub const DEFAULT_ANALYSIS_ENDPOINT: &str = "https://{region}.api.cognitive.microsoft.com";
pub const DEFAULT_STORAGE_API_VERSION: &str = "2019-02-02";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub host: String,
    pub worker_threads: usize,
    /// Blob service base URL; `{account}` is replaced per request.
    pub blob_endpoint: String,
    /// Analysis service base URL; `{region}` is replaced per request.
    pub analysis_endpoint: String,
    pub storage_api_version: String,
    pub upstream_timeout: Duration,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    pub debug_mode: bool,
}

impl AppConfig {
    pub fn new() -> Result<Self, AppError> {
        dotenv().ok();

        let timeout_secs: u64 = parse_var("UPSTREAM_TIMEOUT_SECS", 8)?;
        if timeout_secs == 0 {
            return Err(AppError::Config(
                "UPSTREAM_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            port: parse_var("PORT", 7071)?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            worker_threads: parse_var("WORKER_THREADS", num_cpus::get())?,
            blob_endpoint: env::var("BLOB_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_BLOB_ENDPOINT.to_string()),
            analysis_endpoint: env::var("ANALYSIS_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_ANALYSIS_ENDPOINT.to_string()),
            storage_api_version: env::var("STORAGE_API_VERSION")
                .unwrap_or_else(|_| DEFAULT_STORAGE_API_VERSION.to_string()),
            upstream_timeout: Duration::from_secs(timeout_secs),
            telemetry: TelemetryConfig {
                debug_mode: parse_var("DEBUG_MODE", false)?,
            },
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 7071,
            host: "0.0.0.0".to_string(),
            worker_threads: num_cpus::get(),
            blob_endpoint: DEFAULT_BLOB_ENDPOINT.to_string(),
            analysis_endpoint: DEFAULT_ANALYSIS_ENDPOINT.to_string(),
            storage_api_version: DEFAULT_STORAGE_API_VERSION.to_string(),
            upstream_timeout: Duration::from_secs(8),
            telemetry: TelemetryConfig::default(),
        }
    }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} must be a valid value, got {:?}", key, raw))),
        Err(_) => Ok(default),
    }
}
