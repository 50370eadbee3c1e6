// Database module
// Relational source of solutions, Pinecone as the vector store

pub mod pinecone;
pub mod sql;

pub use pinecone::{
    EntryMetadata, IndexEntry, IndexSetup, IndexSpec, PineconeClient, PineconeIndex, ScoredEntry,
    VectorIndex,
};
pub use sql::{SolutionRecord, SolutionSource, SqlSolutionSource};
