//! In-memory collaborator fakes for testing.
//!
//! Every fake records how often it was called and can be switched into a
//! failing mode, which lets pipeline tests assert on call ordering and on
//! error propagation without any network access.
//!
//! # Feature Flag
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! docsearch-core = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use docsearch_core::mock::{MockEmbedder, MockVectorIndex};
//!
//! let embedder = MockEmbedder::new(8);
//! let index = MockVectorIndex::default();
//!
//! // ... run the pipeline ...
//!
//! assert_eq!(embedder.embed_many_calls(), 1);
//! assert_eq!(index.upsert_calls(), 2);
//! ```

mod account;
mod cache;
mod document;
mod embedding;
mod fixture;
mod index;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub use account::MockAccountStore;
pub use cache::MockSearchCache;
pub use document::MockDocumentStore;
pub use embedding::MockEmbedder;
pub use fixture::MockFixtureSource;
pub use index::{MockVectorIndex, RecordedQuery};

use crate::{Error, Result};

/// Call counter paired with a failure switch.
#[derive(Debug, Default)]
struct CallTracker {
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl CallTracker {
    /// Records a call and fails if the tracker was switched into failing mode.
    fn record(&self, operation: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            tracing::debug!(
                target: crate::TRACING_TARGET_MOCK,
                operation,
                "Mock collaborator failing on request"
            );
            return Err(Error::provider().with_message(format!("mock {operation} unavailable")));
        }
        Ok(())
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

/// Locks a mutex, recovering the data of a poisoned lock.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
