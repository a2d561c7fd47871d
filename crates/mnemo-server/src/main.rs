//! mnemo-server - REST API server binary.

use std::net::SocketAddr;

use mnemo_core::MnemoConfig;
use mnemo_server::{create_notifier, create_server, create_state};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,mnemo_server=debug")),
        )
        .init();

    let host = std::env::var("MNEMO_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("MNEMO_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .map_err(|e| format!("MNEMO_PORT must be a valid port number: {}", e))?;

    let config = match std::env::var("MNEMO_CONFIG") {
        Ok(path) => MnemoConfig::from_file(&path)?.with_env_overrides()?,
        Err(_) => MnemoConfig::from_env()?,
    };

    let state = create_state(config)?;

    let mut notifier = if state.config.notifier.enabled {
        let notifier = create_notifier(&state).await?;
        notifier.start().await?;
        Some(notifier)
    } else {
        info!("Due-card notifier disabled");
        None
    };

    let app = create_server(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting mnemo-server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Shutdown signal received");
        })
        .await?;

    if let Some(notifier) = notifier.as_mut() {
        notifier.shutdown().await?;
    }

    info!("Server stopped cleanly");
    Ok(())
}
