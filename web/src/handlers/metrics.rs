//! Prometheus scrape endpoint.

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

/// Renders every recorded metric in the Prometheus text format.
///
/// ```text
/// GET /metrics
/// ```
///
/// # Errors
///
/// 404 when the process runs without a metrics recorder.
#[allow(clippy::unused_async)]
pub async fn render_metrics(State(state): State<AppState>) -> Result<Response, AppError> {
    let handle = state.metrics.as_ref().ok_or_else(|| {
        AppError::new(
            StatusCode::NOT_FOUND,
            "METRICS_DISABLED",
            "metrics recorder is not installed",
        )
    })?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
        .into_response())
}
