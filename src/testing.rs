// In-memory stand-ins for the remote services, used by unit tests

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use anyhow::{Result, bail};

use crate::database::pinecone::{IndexEntry, ScoredEntry, VectorIndex};
use crate::embeddings::Embedder;

/// Deterministic embedder: each vector is derived from the bytes of the text
pub(crate) struct FakeEmbedder {
    dimension: usize,
    calls: Cell<usize>,
    fail_on: Option<String>,
}

impl FakeEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            calls: Cell::new(0),
            fail_on: None,
        }
    }

    /// Fail every call whose text contains `needle`
    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_on = Some(needle.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Embedder for FakeEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.set(self.calls.get() + 1);
        if let Some(needle) = &self.fail_on {
            if text.contains(needle.as_str()) {
                bail!("embedding rejected");
            }
        }

        let mut vector = vec![0.0f32; self.dimension];
        for (i, byte) in text.bytes().enumerate() {
            vector[i % self.dimension] += f32::from(byte) / 255.0;
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Keyed store with cosine ranking, mirroring create-or-replace upserts
#[derive(Default)]
pub(crate) struct MemoryIndex {
    entries: RefCell<BTreeMap<String, IndexEntry>>,
    upserts: Cell<usize>,
    dimension: Option<usize>,
}

impl MemoryIndex {
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension: Some(dimension),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn upserts(&self) -> usize {
        self.upserts.get()
    }

    pub fn get(&self, id: &str) -> Option<IndexEntry> {
        self.entries.borrow().get(id).cloned()
    }
}

impl VectorIndex for MemoryIndex {
    fn upsert(&self, entry: &IndexEntry) -> Result<()> {
        self.upserts.set(self.upserts.get() + 1);
        self.entries
            .borrow_mut()
            .insert(entry.id.clone(), entry.clone());
        Ok(())
    }

    fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredEntry>> {
        let mut matches: Vec<ScoredEntry> = self
            .entries
            .borrow()
            .values()
            .map(|entry| -> Result<ScoredEntry> {
                let metadata = match serde_json::to_value(&entry.metadata)? {
                    serde_json::Value::Object(map) => map,
                    _ => serde_json::Map::new(),
                };
                Ok(ScoredEntry {
                    id: entry.id.clone(),
                    score: cosine(vector, &entry.values),
                    metadata,
                })
            })
            .collect::<Result<_>>()?;

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(top_k);
        Ok(matches)
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
