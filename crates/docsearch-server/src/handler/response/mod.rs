//! Response types for HTTP handlers.

mod authentications;
mod errors;
mod extractions;
mod monitors;
mod uploads;

pub use authentications::*;
pub use errors::*;
pub use extractions::*;
pub use monitors::*;
pub use uploads::*;
