use std::collections::HashMap;
use std::sync::Mutex;

use super::{CallTracker, lock};
use crate::types::OcrFixture;
use crate::{FixtureSource, Result};

/// In-memory extraction fixtures keyed by file identifier.
#[derive(Debug, Default)]
pub struct MockFixtureSource {
    fixtures: Mutex<HashMap<String, OcrFixture>>,
    fetches: CallTracker,
}

impl MockFixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fixture made of the given paragraph texts.
    pub fn with_paragraphs<I, S>(self, file_id: impl Into<String>, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        lock(&self.fixtures).insert(file_id.into(), OcrFixture::from_texts(texts));
        self
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetches.calls()
    }

    /// Makes every subsequent `fetch` fail.
    pub fn set_failing(&self, failing: bool) {
        self.fetches.set_failing(failing);
    }
}

#[async_trait::async_trait]
impl FixtureSource for MockFixtureSource {
    async fn fetch(&self, file_id: &str) -> Result<Option<OcrFixture>> {
        self.fetches.record("fixture_fetch")?;
        Ok(lock(&self.fixtures).get(file_id).cloned())
    }
}
