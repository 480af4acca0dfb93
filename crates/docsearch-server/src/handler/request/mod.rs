//! Request types for HTTP handlers.

mod authentications;
mod extractions;
mod ocr;

pub use authentications::*;
pub use extractions::*;
pub use ocr::*;
