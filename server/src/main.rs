//! Darshan booking HTTP server.

use darshan_server::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    darshan_server::init_tracing(&config.server.log_level);

    tracing::info!(
        address = %config.server.bind_address(),
        sweep_interval_secs = config.sweeper.interval_secs,
        metrics_enabled = config.server.metrics_enabled,
        "Configuration loaded"
    );

    darshan_server::run(config).await
}
