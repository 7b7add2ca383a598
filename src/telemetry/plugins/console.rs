use crate::telemetry::{
    metrics::{ExportError, MetricsExporter},
    RequestMetrics,
};
use async_trait::async_trait;

/// Prints every request's metrics to stdout. Registered in debug mode.
#[derive(Debug, Default)]
pub struct ConsolePlugin;

impl ConsolePlugin {
    pub fn new() -> Self {
        ConsolePlugin
    }
}

#[async_trait]
impl MetricsExporter for ConsolePlugin {
    async fn export_metrics(&self, metrics: RequestMetrics) -> Result<(), ExportError> {
        println!("Request Metrics:\n{}", serde_json::to_string_pretty(&metrics)?);
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
