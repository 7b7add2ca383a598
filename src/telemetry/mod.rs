pub mod metrics;
pub mod middleware;
pub mod plugins;

pub use self::{
    metrics::{MetricsExporter, MetricsRegistry},
    middleware::{metrics_middleware, REQUEST_ID_HEADER},
    plugins::ConsolePlugin,
};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Attached to relay responses as an extension so the middleware can report
/// what happened upstream.
#[derive(Debug, Clone, Default)]
pub struct RelayOutcome {
    pub content_type: Option<String>,
    pub analysis_status: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestMetrics {
    // Request metadata
    pub request_id: String,
    pub path: String,
    pub method: String,

    // Timing metrics
    pub total_latency: Duration,

    // Size metrics
    pub request_size: usize,
    pub response_size: usize,

    // Status metrics
    pub status_code: u16,

    // Relay metrics
    pub content_type: Option<String>,
    pub analyzed: bool,
    pub analysis_status_code: Option<u16>,
}
