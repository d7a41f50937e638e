//! Request correlation.
//!
//! Every booking request carries an id that shows up in the engine's log
//! lines and comes back to the client, so a devotee's support query can be
//! matched to the exact booking attempt. A well-formed `X-Correlation-ID`
//! from the caller is reused; anything else is replaced by a fresh UUID.
//!
//! ```
//! use axum::{Router, routing::get};
//! use darshan_web::middleware::correlation_id_layer;
//!
//! let app: Router = Router::new()
//!     .route("/health", get(|| async { "ok" }))
//!     .layer(correlation_id_layer());
//! ```

use crate::extractors::CorrelationId;
use axum::{extract::Request, http::HeaderValue, response::Response};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for correlation ID.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// Tags each request with a [`CorrelationId`].
#[must_use]
pub const fn correlation_id_layer() -> CorrelationIdLayer {
    CorrelationIdLayer
}

/// See [`correlation_id_layer`].
#[derive(Clone, Copy, Debug)]
pub struct CorrelationIdLayer;

impl<S> Layer<S> for CorrelationIdLayer {
    type Service = CorrelationIdMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationIdMiddleware { inner }
    }
}

/// Service produced by [`CorrelationIdLayer`].
#[derive(Clone, Debug)]
pub struct CorrelationIdMiddleware<S> {
    inner: S,
}

impl<S> Service<Request> for CorrelationIdMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let id = incoming_id(&req).unwrap_or_else(Uuid::new_v4);
        req.extensions_mut().insert(CorrelationId(id));

        // Engine log events for the request inherit these fields
        let span = tracing::info_span!(
            "booking_api",
            request_id = %id,
            method = %req.method(),
            path = req.uri().path(),
        );
        let fut = self.inner.call(req).instrument(span);

        Box::pin(async move {
            let mut response = fut.await?;
            if let Ok(echo) = HeaderValue::from_str(&id.to_string()) {
                response.headers_mut().insert(CORRELATION_ID_HEADER, echo);
            }
            Ok(response)
        })
    }
}

fn incoming_id(req: &Request) -> Option<Uuid> {
    let raw = req.headers().get(CORRELATION_ID_HEADER)?.to_str().ok()?;
    Uuid::parse_str(raw.trim()).ok()
}
