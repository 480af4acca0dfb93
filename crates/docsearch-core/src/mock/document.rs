use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use bytes::Bytes;
use jiff::Timestamp;
use url::Url;

use super::{CallTracker, lock};
use crate::{DocumentStore, Error, Result};

/// In-memory document store issuing storage-style signed URLs.
#[derive(Debug)]
pub struct MockDocumentStore {
    base_url: String,
    objects: Mutex<HashMap<String, (Bytes, String)>>,
    puts: CallTracker,
}

impl MockDocumentStore {
    /// Creates a store whose signed URLs point at `https://<domain>/<bucket>/<name>`.
    pub fn new(domain: &str, bucket: &str) -> Self {
        Self {
            base_url: format!("https://{domain}/{bucket}"),
            objects: Mutex::new(HashMap::new()),
            puts: CallTracker::default(),
        }
    }

    /// Returns the stored bytes and content type of `name`.
    pub fn object(&self, name: &str) -> Option<(Bytes, String)> {
        lock(&self.objects).get(name).cloned()
    }

    /// Returns the names of all stored objects.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = lock(&self.objects).keys().cloned().collect();
        names.sort();
        names
    }

    pub fn put_calls(&self) -> usize {
        self.puts.calls()
    }

    /// Makes every subsequent `put` fail.
    pub fn set_failing(&self, failing: bool) {
        self.puts.set_failing(failing);
    }
}

#[async_trait::async_trait]
impl DocumentStore for MockDocumentStore {
    async fn put(&self, name: &str, data: Bytes, content_type: &str) -> Result<()> {
        self.puts.record("document_put")?;
        lock(&self.objects).insert(name.to_owned(), (data, content_type.to_owned()));
        Ok(())
    }

    async fn presign_read(&self, name: &str, expires_in: Duration) -> Result<Url> {
        if !lock(&self.objects).contains_key(name) {
            return Err(Error::not_found().with_message(format!("object {name} not found")));
        }

        let expires = Timestamp::now().as_second() + expires_in.as_secs() as i64;
        let mut url = Url::parse(&format!("{}/{}", self.base_url, name))
            .map_err(|e| Error::internal().with_message("invalid signed URL").with_source(e))?;
        url.query_pairs_mut()
            .append_pair("Expires", &expires.to_string());
        Ok(url)
    }
}
