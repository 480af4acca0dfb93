//! Authentication and abuse protection services.

mod password_hasher;
mod rate_limiter;
mod session_keys;

pub use password_hasher::PasswordHasher;
pub use rate_limiter::{RateLimitConfig, RateLimitExceeded, RateLimitKey, RateLimiter};
pub use session_keys::{SessionKeys, TokenClaims};
