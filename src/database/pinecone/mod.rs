// Pinecone vector index module
// Index lifecycle on the control plane, upserts and queries on the data plane


pub mod client;

pub use client::{IndexDescription, IndexSetup, IndexSpec, PineconeClient, PineconeIndex};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One vector as written to the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Key of the entry; `solution_<record id>`
    pub id: String,
    /// Embedding of `metadata.text`
    pub values: Vec<f32>,
    pub metadata: EntryMetadata,
}

/// Metadata stored next to each vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// Pinecone rejects null metadata, so an absent title is omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub id: i64,
    pub text: String,
}

/// A match returned by a similarity query, ranked by the store's own metric
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScoredEntry {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Write and search access to an existing vector index
pub trait VectorIndex {
    /// Create or replace the entry with `entry.id`
    fn upsert(&self, entry: &IndexEntry) -> Result<()>;

    /// The `top_k` nearest entries to `vector`, best first
    fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredEntry>>;

    /// Vector length the index accepts, when the store reports one
    fn dimension(&self) -> Option<usize>;
}
