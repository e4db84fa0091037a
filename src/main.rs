use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use table_loader::{api, config::Config, updater::CommandUpdater, AppState};

/// How long in-flight requests get to finish after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    match log_format.to_lowercase().as_str() {
        "gcp" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_stackdriver::layer())
                .init();
        }
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_list(false),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "table-loader starting");

    // Load configuration
    let config = Config::load()?;
    info!("Database: {}", config.paths.database_path.display());
    info!("Upload directory: {}", config.paths.upload_dir.display());
    info!(
        "Update tool: {} {:?} (in {})",
        config.updater.program,
        config.updater.args,
        config.updater.working_dir.display()
    );

    let updater = Arc::new(CommandUpdater::new(&config.updater));
    let state = Arc::new(AppState::new(config.clone(), updater)?);

    // TLS
    let tls = axum_server::tls_rustls::RustlsConfig::from_pem_file(
        &config.server.tls_cert_path,
        &config.server.tls_key_path,
    )
    .await?;
    info!(
        "Loaded TLS certificate from {}",
        config.server.tls_cert_path.display()
    );

    // Build and start the HTTPS server
    let app = api::create_router(Arc::clone(&state));
    let addr: SocketAddr = config.server.bind_address.parse()?;

    let handle = axum_server::Handle::new();
    tokio::spawn(shutdown_signal(handle.clone()));

    info!("Listening on: https://{}", addr);
    axum_server::bind_rustls(addr, tls)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal(handle: axum_server::Handle) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
