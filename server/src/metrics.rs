//! Prometheus recorder setup.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder and describe the booking metrics.
///
/// The returned handle renders the scrape body served at `/metrics`.
///
/// # Errors
///
/// Returns [`BuildError`] if a global recorder is already installed.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    darshan_core::metrics::register_metrics();
    Ok(handle)
}
