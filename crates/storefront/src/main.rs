//! Papelaria Santa Fé storefront server.
//!
//! Serves the static storefront from the public directory, with a redirect
//! page at `/` and health probes for the load balancer.
//!
//! The database schema is NOT created on startup. Provision it explicitly:
//! ```bash
//! papelaria setup
//! papelaria seed
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::error::Error;

use papelaria_storefront::config::StorefrontConfig;
use papelaria_storefront::state::AppState;
use papelaria_storefront::{db, routes, telemetry};

#[tokio::main]
async fn main() {
    telemetry::init_tracing("papelaria_storefront=info,tower_http=debug");

    if let Err(e) = run().await {
        tracing::error!("Server failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let config = StorefrontConfig::from_env()?;

    if !config.public_dir.is_dir() {
        tracing::warn!(
            public_dir = %config.public_dir.display(),
            "Public directory not found; static files will return 404"
        );
    }

    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database pool created");

    let addr = config.socket_addr();
    let app = routes::app(AppState::new(config, pool.clone()));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("storefront listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
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
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
