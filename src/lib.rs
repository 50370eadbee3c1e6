use thiserror::Error;

pub type Result<T> = std::result::Result<T, FindasoError>;

#[derive(Error, Debug)]
pub enum FindasoError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<config::ConfigError> for FindasoError {
    #[inline]
    fn from(error: config::ConfigError) -> Self {
        Self::Config(error.to_string())
    }
}

pub mod commands;
pub mod config;
pub mod database;
pub mod document;
pub mod embeddings;
mod http;
pub mod indexer;
pub mod search;

#[cfg(test)]
pub(crate) mod testing;
