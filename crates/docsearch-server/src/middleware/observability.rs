//! Request tracing with request IDs and sensitive header masking.

use axum::Router;
use axum::http::header::{self, HeaderName};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Credentials that must never reach the logs.
const REDACTED_HEADERS: [HeaderName; 2] = [header::AUTHORIZATION, header::COOKIE];

/// Per request tracing span tagged with an `x-request-id`.
///
/// A caller supplied id is kept, otherwise a UUID is generated. Either way
/// the id is echoed on the response.
pub trait RouterObservabilityExt<S> {
    fn with_observability(self) -> Self;
}

impl<S> RouterObservabilityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_observability(self) -> Self {
        self.layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
            .layer(SetSensitiveRequestHeadersLayer::new(REDACTED_HEADERS))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
    }
}
