// Embeddings module
// Markdown chunking and the remote embedding provider

pub mod chunking;
pub mod openai;

pub use chunking::{ChunkingConfig, Chunks, MarkdownSplitter};
pub use openai::{DEFAULT_EMBEDDING_DIMENSION, OpenAiClient};

use anyhow::Result;

/// Turns one piece of text into a fixed-length vector
pub trait Embedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Length of every vector returned by `embed`
    fn dimension(&self) -> usize;
}
