//! Data types exchanged with docsearch collaborators.

mod account;
mod fixture;
mod record;

pub use account::Account;
pub use fixture::{OcrFixture, Paragraph};
pub use record::{MetadataFilter, QueryMatch, RecordMetadata, VectorRecord};
