// Search module
// Nearest-neighbour lookup of indexed solutions for a free-text query


use std::fmt;

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::validate_top_k;
use crate::database::pinecone::{ScoredEntry, VectorIndex};
use crate::embeddings::Embedder;

/// Metadata key holding the embedded chunk text
const TEXT_KEY: &str = "text";

/// A search hit: the stored chunk plus whatever else was stored with it
#[derive(Debug, Clone, PartialEq)]
pub struct SearchDocument {
    pub page_content: String,
    pub metadata: Map<String, Value>,
    pub score: f32,
}

impl SearchDocument {
    /// `None` when the entry carries no chunk text
    pub fn from_entry(entry: ScoredEntry) -> Option<Self> {
        let mut metadata = entry.metadata;
        let page_content = match metadata.remove(TEXT_KEY)? {
            Value::String(text) => text,
            other => other.to_string(),
        };

        Some(Self {
            page_content,
            metadata,
            score: entry.score,
        })
    }
}

impl fmt::Display for SearchDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "* {} [{}]",
            self.page_content,
            Value::Object(self.metadata.clone())
        )
    }
}

/// Embed `query` and return up to `k` of the closest indexed chunks, best first
pub fn similarity_search<E, V>(
    embedder: &E,
    index: &V,
    query: &str,
    k: usize,
) -> Result<Vec<SearchDocument>>
where
    E: Embedder + ?Sized,
    V: VectorIndex + ?Sized,
{
    validate_top_k(k)?;

    let vector = embedder.embed(query).context("Failed to embed query")?;
    let matches = index.query(&vector, k).context("Failed to query index")?;
    debug!("Index returned {} matches for k={}", matches.len(), k);

    Ok(matches
        .into_iter()
        .filter_map(|entry| {
            let id = entry.id.clone();
            let document = SearchDocument::from_entry(entry);
            if document.is_none() {
                warn!("Skipping match '{}' without stored text", id);
            }
            document
        })
        .collect())
}
