//! HomeNest API server.
//!
//! Reads configuration from the command line and environment (a `.env`
//! file is loaded first), opens the document store once, and serves the
//! router until Ctrl-C or SIGTERM.

use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use homenest_api::auth::IdentityHeaderPolicy;
use homenest_api::config::{LogFormat, ServeArgs};
use homenest_api::middleware::metrics;
use homenest_api::state::{init_store, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is fine.
    dotenv::dotenv().ok();

    let config = ServeArgs::parse().into_config()?;
    init_tracing(config.log_format);
    tracing::debug!(?config, "configuration loaded");

    let store = init_store(config.store.as_ref())
        .await
        .context("failed to connect to the document store")?;

    let policy = IdentityHeaderPolicy::parse(&config.identity_header)
        .with_context(|| format!("invalid identity header {:?}", config.identity_header))?;

    let mut state = AppState::new(store).with_access_policy(policy);
    if config.metrics_enabled {
        let handle = metrics::install_recorder().context("failed to install metrics recorder")?;
        state = state.with_metrics(handle);
    }

    let app = homenest_api::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("homenest-api listening on {addr}");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("homenest-api stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "failed to listen for SIGTERM");
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
    tracing::info!("shutdown signal received, draining connections");
}
