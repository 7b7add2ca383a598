use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use async_trait::async_trait;
use form_analysis_relay::{
    config::AppConfig,
    context::Secret,
    startup::{AppState, Application},
    storage::signing::shared_key_authorization,
    telemetry::{metrics::ExportError, MetricsExporter, MetricsRegistry, RequestMetrics},
};
use serde_json::json;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU16, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};
use tokio::net::TcpListener;

pub const ACCOUNT: &str = "relayacct";
/// base64("relay-test-key")
pub const ACCOUNT_KEY: &str = "cmVsYXktdGVzdC1rZXk=";
pub const CONTAINER: &str = "forms";
pub const REGION: &str = "westus2";
pub const MODEL_ID: &str = "3b2c7d1e";
pub const SUBSCRIPTION_KEY: &str = "sub-key-123";

/// A blob read request as the storage stub saw it.
#[derive(Debug, Clone)]
pub struct BlobRead {
    pub path: String,
    pub authorization: Option<String>,
    pub has_ms_date: bool,
}

/// An analyze request as the analysis stub saw it.
#[derive(Debug, Clone)]
pub struct AnalyzeCall {
    pub region: String,
    pub model_id: String,
    pub content_type: Option<String>,
    pub subscription_key: Option<String>,
    pub body: Bytes,
}

#[derive(Default)]
pub struct BlobStub {
    blobs: Mutex<HashMap<String, (String, Bytes)>>,
    pub reads: Mutex<Vec<BlobRead>>,
}

impl BlobStub {
    pub fn put(&self, container: &str, blob: &str, content_type: &str, content: &'static [u8]) {
        self.blobs.lock().unwrap().insert(
            format!("{}/{}", container, blob),
            (content_type.to_string(), Bytes::from_static(content)),
        );
    }
}

pub struct AnalysisStub {
    pub calls: AtomicUsize,
    pub status: AtomicU16,
    pub requests: Mutex<Vec<AnalyzeCall>>,
}

impl Default for AnalysisStub {
    fn default() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            status: AtomicU16::new(200),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl AnalysisStub {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

async fn get_blob(
    State(stub): State<Arc<BlobStub>>,
    Path((account, container, blob)): Path<(String, String, String)>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    stub.reads.lock().unwrap().push(BlobRead {
        path: format!("/{}/{}/{}", account, container, blob),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        has_ms_date: headers.contains_key("x-ms-date"),
    });

    if let Some(auth) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        let header_str = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };
        let (date, version) = (header_str("x-ms-date"), header_str("x-ms-version"));
        let expected = shared_key_authorization(
            "GET",
            &account,
            &Secret::new(ACCOUNT_KEY),
            &[("x-ms-date", date.as_str()), ("x-ms-version", version.as_str())],
            &format!("/{}{}", account, uri.path()),
        );
        if expected.ok().as_deref() != Some(auth) {
            return StatusCode::FORBIDDEN.into_response();
        }
    }

    let entry = stub
        .blobs
        .lock()
        .unwrap()
        .get(&format!("{}/{}", container, blob))
        .cloned();

    match entry {
        Some((content_type, content)) => {
            ([(header::CONTENT_TYPE, content_type)], content).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn analyze(
    State(stub): State<Arc<AnalysisStub>>,
    Path((region, model_id)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    stub.calls.fetch_add(1, Ordering::SeqCst);
    stub.requests.lock().unwrap().push(AnalyzeCall {
        region,
        model_id,
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        subscription_key: headers
            .get("ocp-apim-subscription-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    let status = StatusCode::from_u16(stub.status.load(Ordering::SeqCst)).unwrap();
    let body = if status.is_success() {
        json!({"status": "success", "pages": [{"number": 1, "keyValuePairs": []}]})
    } else {
        json!({"error": {"code": "401", "message": "Access denied due to invalid subscription key."}})
    };
    (status, Json(body)).into_response()
}

async fn spawn_router(router: Router) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub listener");
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    port
}

/// Keeps every recorded request's metrics for later assertions.
#[derive(Clone, Default)]
pub struct RecordingExporter(pub Arc<Mutex<Vec<RequestMetrics>>>);

#[async_trait]
impl MetricsExporter for RecordingExporter {
    async fn export_metrics(&self, metrics: RequestMetrics) -> Result<(), ExportError> {
        self.0.lock().unwrap().push(metrics);
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// A port that accepts connections and never answers.
pub async fn stalled_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    port
}

/// A port nothing listens on.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

pub struct TestApp {
    pub address: String,
    pub blobs: Arc<BlobStub>,
    pub analysis: Arc<AnalysisStub>,
    pub metrics: RecordingExporter,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawns the stubs and the relay; `customize` may adjust the relay's
    /// configuration after the stub endpoints are filled in.
    pub async fn spawn_with(customize: impl FnOnce(&mut AppConfig)) -> Self {
        let blobs = Arc::new(BlobStub::default());
        let analysis = Arc::new(AnalysisStub::default());

        let blob_port = spawn_router(
            Router::new()
                .route("/:account/:container/*blob", get(get_blob))
                .with_state(blobs.clone()),
        )
        .await;
        let analysis_port = spawn_router(
            Router::new()
                .route(
                    "/:region/formrecognizer/v1.0-preview/custom/models/:model_id/analyze",
                    post(analyze),
                )
                .with_state(analysis.clone()),
        )
        .await;

        let mut config = AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            blob_endpoint: format!("http://127.0.0.1:{}/{{account}}", blob_port),
            analysis_endpoint: format!("http://127.0.0.1:{}/{{region}}", analysis_port),
            upstream_timeout: Duration::from_secs(2),
            ..AppConfig::default()
        };
        customize(&mut config);

        let metrics = RecordingExporter::default();
        let registry = MetricsRegistry::new(false);
        registry.register_exporter(Box::new(metrics.clone())).await;

        let state = AppState::from_config(config).expect("Failed to build application state");
        let app = Application::build_with_registry(state, registry)
            .await
            .expect("Failed to build test application");
        let address = format!("http://127.0.0.1:{}", app.port());
        tokio::spawn(app.run_until_stopped(std::future::pending()));

        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client.get(format!("{}/health", address)).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        TestApp {
            address,
            blobs,
            analysis,
            metrics,
            client,
        }
    }

    /// Headers for a fully specified relay request.
    pub fn relay_headers(&self, blob_name: &str) -> Vec<(&'static str, String)> {
        vec![
            ("storage_account_name", ACCOUNT.to_string()),
            ("storage_account_key", ACCOUNT_KEY.to_string()),
            ("container_name", CONTAINER.to_string()),
            ("blob_name", blob_name.to_string()),
            ("region", REGION.to_string()),
            ("model_id", MODEL_ID.to_string()),
            ("subscription_key", SUBSCRIPTION_KEY.to_string()),
        ]
    }

    pub async fn analyze_form(&self, headers: &[(&'static str, String)]) -> reqwest::Response {
        let mut request = self.client.post(format!("{}/api/AnalyzeForm", self.address));
        for (name, value) in headers {
            request = request.header(*name, value);
        }
        request.send().await.expect("Failed to send relay request")
    }
}
