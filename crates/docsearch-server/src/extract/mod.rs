//! Request extractors rejecting with JSON [`Error`] responses.
//!
//! [`Error`]: crate::handler::Error

mod auth;
pub mod reject;

pub use crate::extract::auth::AuthClaims;
pub use crate::extract::reject::{Form, Json, Multipart, ValidateJson};
