use crate::{
    analysis::{AnalysisService, FormRecognizerClient},
    client::build_client,
    config::AppConfig,
    error::AppError,
    handlers,
    storage::{AzureBlobStore, BlobStore},
    telemetry::{metrics_middleware, ConsolePlugin, MetricsRegistry},
};
use axum::{
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};

/// Immutable state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub blob_store: Arc<dyn BlobStore>,
    pub analysis: Arc<dyn AnalysisService>,
}

impl AppState {
    pub fn from_config(config: AppConfig) -> Result<Self, AppError> {
        let client = build_client(config.upstream_timeout)?;
        let blob_store = AzureBlobStore::new(
            client.clone(),
            config.blob_endpoint.clone(),
            config.storage_api_version.clone(),
        );
        let analysis = FormRecognizerClient::new(client, config.analysis_endpoint.clone());

        Ok(Self {
            config: Arc::new(config),
            blob_store: Arc::new(blob_store),
            analysis: Arc::new(analysis),
        })
    }
}

pub fn router(state: AppState, metrics_registry: MetricsRegistry) -> Router {
    debug!("Setting up CORS layer with 1-hour max age");
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/api/AnalyzeForm",
            get(handlers::analyze_form).post(handlers::analyze_form),
        )
        .layer(from_fn_with_state(metrics_registry, metrics_middleware))
        .with_state(state)
        .layer(cors)
}

pub struct Application {
    listener: TcpListener,
    router: Router,
    port: u16,
}

impl Application {
    pub async fn build(config: AppConfig) -> Result<Self, AppError> {
        let state = AppState::from_config(config)?;
        Self::build_with_state(state).await
    }

    pub async fn build_with_state(state: AppState) -> Result<Self, AppError> {
        let metrics_registry = MetricsRegistry::new(state.config.telemetry.debug_mode);
        if state.config.telemetry.debug_mode {
            debug!("Registering Console plugin for metrics");
            metrics_registry
                .register_exporter(Box::new(ConsolePlugin::new()))
                .await;
        }
        Self::build_with_registry(state, metrics_registry).await
    }

    /// Binds the listener using a caller-provided metrics registry.
    pub async fn build_with_registry(
        state: AppState,
        metrics_registry: MetricsRegistry,
    ) -> Result<Self, AppError> {
        let addr = format!("{}:{}", state.config.host, state.config.port);
        let listener = TcpListener::bind(addr.as_str()).await?;
        let port = listener.local_addr()?.port();
        info!("Form analysis relay bound to {}:{}", state.config.host, port);

        Ok(Self {
            listener,
            router: router(state, metrics_registry),
            port,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(
            self.listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
    }
}
