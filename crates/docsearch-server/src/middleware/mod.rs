//! Middleware for `axum::Router` and HTTP request processing.
//!
//! Layers are applied through router extension traits, outermost last:
//!
//! ```rust,ignore
//! let app = routes(state.clone())
//!     .with_state(state)
//!     .with_open_api(&open_api)
//!     .with_security(&cors, &SecurityHeadersConfig::default(), body_limit)
//!     .with_observability()
//!     .with_recovery(&recovery);
//! ```

mod observability;
mod rate_limit;
mod recovery;
mod security;
mod specification;

pub use observability::RouterObservabilityExt;
pub use rate_limit::rate_limit_by_ip;
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use security::{CorsConfig, RouterSecurityExt, SecurityHeadersConfig, upload_body_limit};
pub use specification::{OpenApiConfig, RouterOpenApiExt};
