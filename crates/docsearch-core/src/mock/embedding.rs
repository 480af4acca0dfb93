use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{CallTracker, lock};
use crate::{EmbeddingProvider, Result};

/// Deterministic embedder deriving vectors from the text bytes.
///
/// Equal texts always map to equal vectors.
#[derive(Debug)]
pub struct MockEmbedder {
    dimensions: usize,
    one: CallTracker,
    many: CallTracker,
    batches: Mutex<Vec<Vec<String>>>,
    surplus: AtomicUsize,
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new(8)
    }
}

impl MockEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            one: CallTracker::default(),
            many: CallTracker::default(),
            batches: Mutex::new(Vec::new()),
            surplus: AtomicUsize::new(0),
        }
    }

    /// Returns the vector this embedder produces for `text`.
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let seed = text
            .bytes()
            .fold(17u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)));
        (0..self.dimensions)
            .map(|i| {
                let mixed = seed.rotate_left(i as u32 % 32) ^ (i as u32).wrapping_mul(2_654_435_761);
                (mixed % 10_000) as f32 / 10_000.0 + 0.0001
            })
            .collect()
    }

    pub fn embed_one_calls(&self) -> usize {
        self.one.calls()
    }

    pub fn embed_many_calls(&self) -> usize {
        self.many.calls()
    }

    /// Returns the texts of every `embed_many` call, in call order.
    pub fn batches(&self) -> Vec<Vec<String>> {
        lock(&self.batches).clone()
    }

    /// Makes every subsequent call fail.
    pub fn set_failing(&self, failing: bool) {
        self.one.set_failing(failing);
        self.many.set_failing(failing);
    }

    /// Appends `extra` unrequested vectors to every `embed_many` result.
    pub fn set_surplus(&self, extra: usize) {
        self.surplus.store(extra, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.one.record("embed_one")?;
        Ok(self.vector_for(text))
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.many.record("embed_many")?;
        lock(&self.batches).push(texts.to_vec());
        let extra = self.surplus.load(Ordering::SeqCst);
        let mut vectors: Vec<_> = texts.iter().map(|text| self.vector_for(text)).collect();
        vectors.extend((0..extra).map(|i| self.vector_for(&format!("surplus-{i}"))));
        Ok(vectors)
    }
}
