//! Per-client rate limiting.

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::http::header::RETRY_AFTER;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_client_ip::ClientIp;

use crate::handler::Error;
use crate::service::{RateLimitExceeded, RateLimitKey, RateLimiter};

/// Rate limits requests by client IP address.
///
/// The client address is resolved by [`ClientIp`], so the router must carry a
/// [`ClientIpSource`] extension. Rejected requests get `429` with a
/// `retry-after` header in whole seconds.
///
/// ```rust,ignore
/// use axum::middleware::from_fn_with_state;
///
/// let layer = from_fn_with_state(state.clone(), rate_limit_by_ip);
/// ```
///
/// [`ClientIpSource`]: axum_client_ip::ClientIpSource
pub async fn rate_limit_by_ip(
    ClientIp(ip_address): ClientIp,
    State(rate_limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let key = RateLimitKey::from_ip(ip_address);

    match rate_limiter.check(key).await {
        Ok(()) => next.run(request).await,
        Err(exceeded) => too_many_requests(exceeded),
    }
}

fn too_many_requests(exceeded: RateLimitExceeded) -> Response {
    // Round up so clients never retry before a token is back.
    let retry_after = exceeded.retry_after.as_secs_f64().ceil().max(1.0) as u64;

    let mut response = Error::from(exceeded).into_response();
    response
        .headers_mut()
        .insert(RETRY_AFTER, HeaderValue::from(retry_after));
    response
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn retry_after_rounds_up() {
        let response = too_many_requests(RateLimitExceeded {
            retry_after: Duration::from_millis(11_200),
        });

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(RETRY_AFTER),
            Some(&HeaderValue::from(12_u64))
        );
    }
}
