use form_analysis_relay::{config::AppConfig, startup::Application};
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().compact())
        .init();

    // Load configuration
    info!("Loading application configuration");
    let config = match AppConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    debug!(
        "Configuration loaded: port={}, host={}, worker_threads={}, timeout={:?}",
        config.port, config.host, config.worker_threads, config.upstream_timeout
    );

    info!(
        "Configuring tokio runtime with {} worker threads",
        config.worker_threads
    );
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.worker_threads.max(1))
        .thread_stack_size(2 * 1024 * 1024)
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            error!("Failed to build tokio runtime: {}", e);
            std::process::exit(1);
        });

    runtime.block_on(async move {
        let app = match Application::build(config).await {
            Ok(app) => app,
            Err(e) => {
                error!("Failed to start form analysis relay: {}", e);
                std::process::exit(1);
            }
        };

        info!("Form analysis relay listening on port {}", app.port());
        if let Err(e) = app.run_until_stopped(shutdown_signal()).await {
            error!("Server error: {}", e);
            std::process::exit(1);
        }
    });
}

async fn shutdown_signal() {
    info!("Registering shutdown signal handler");
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install CTRL+C signal handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            debug!("CTRL+C signal received");
        },
        _ = terminate => {
            debug!("Terminate signal received");
        },
    }
    info!("Shutdown signal received, starting graceful shutdown");
}
