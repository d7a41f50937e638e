//! # Darshan Server
//!
//! Wires the booking engine, HTTP API, expiry sweeper and Prometheus
//! recorder into one process.
//!
//! ## Environment
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `HOST` / `PORT` | `0.0.0.0` / `8080` | Bind address |
//! | `RUST_LOG` | `info` | Log filter |
//! | `SHUTDOWN_TIMEOUT` | `30` | Seconds to drain requests on shutdown |
//! | `METRICS_ENABLED` | `true` | Serve `/metrics` |
//! | `EXPIRY_SWEEP_INTERVAL_SECS` | `60` | Seconds between expiry sweeps |
//! | `DARSHAN_*` | see [`config`] | Booking rules and schedule |

pub mod config;
pub mod metrics;
pub mod sweeper;

use anyhow::Context;
use config::Config;
use darshan_core::BookingEngine;
use darshan_core::environment::SystemClock;
use darshan_web::{AppState, build_router};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins; otherwise `default_filter` applies to the darshan crates
/// and `tower_http`.
pub fn init_tracing(default_filter: &str) {
    let fallback = format!(
        "darshan_server={default_filter},darshan_web={default_filter},darshan_core={default_filter},tower_http=debug"
    );
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Build the engine and run the server until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the booking config is invalid, the metrics recorder
/// cannot be installed, or the listener cannot bind.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let engine = Arc::new(
        BookingEngine::new(config.booking.clone(), Arc::new(SystemClock))
            .context("invalid booking configuration")?,
    );
    tracing::info!(
        slots_per_day = engine.schedule().len(),
        horizon_days = config.booking.booking_horizon_days,
        "Booking engine ready"
    );

    let mut state = AppState::new(Arc::clone(&engine));
    if config.server.metrics_enabled {
        let handle = metrics::install_recorder().context("failed to install Prometheus recorder")?;
        state = state.with_metrics(handle);
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = sweeper::spawn_expiry_sweeper(
        Arc::clone(&engine),
        config.sweeper.interval(),
        shutdown_rx.clone(),
    );

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(address = %addr, "Server listening");

    let mut server_shutdown = shutdown_rx;
    let server = tokio::spawn(async move {
        axum::serve(listener, build_router(state))
            .with_graceful_shutdown(async move {
                let _ = server_shutdown.wait_for(|stop| *stop).await;
            })
            .await
    });

    shutdown_signal().await;
    let _ = shutdown_tx.send(true);

    let drain = Duration::from_secs(config.server.shutdown_timeout);
    match tokio::time::timeout(drain, server).await {
        Ok(joined) => joined.context("server task panicked")??,
        Err(_) => tracing::warn!(timeout_secs = drain.as_secs(), "Shutdown timed out with requests in flight"),
    }
    if tokio::time::timeout(drain, sweeper).await.is_err() {
        tracing::warn!("Expiry sweeper did not stop in time");
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
