use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::database::pinecone::{IndexSetup, IndexSpec, PineconeClient};
use crate::database::sql::{SolutionSource, SqlSolutionSource};
use crate::embeddings::{MarkdownSplitter, OpenAiClient};
use crate::indexer::{Indexer, IndexingStats};
use crate::search::{SearchDocument, similarity_search};

/// Embed every solution in the source database into the Pinecone index
#[inline]
pub async fn ingest(config: &Config) -> Result<IndexingStats> {
    let pinecone = PineconeClient::new(config).context("Failed to initialize Pinecone client")?;
    let (index, setup) = pinecone
        .ensure_index(&IndexSpec::from_config(config))
        .context("Failed to prepare Pinecone index")?;
    if setup == IndexSetup::Created {
        info!("Created index '{}'", index.name());
    }

    let embedder = OpenAiClient::new(config).context("Failed to initialize OpenAI client")?;
    let splitter =
        MarkdownSplitter::from_config(&config.chunking).context("Invalid chunking settings")?;

    let source = SqlSolutionSource::new(config.secrets.database_url.clone());
    let records = source
        .fetch_solutions()
        .await
        .context("Failed to read solutions")?;

    let stats = Indexer::new(&embedder, &index, splitter).index_solutions(&records)?;

    println!("All embeddings generated and uploaded to Pinecone!");
    Ok(stats)
}

/// Print the `k` indexed chunks closest to `text`
#[inline]
pub fn query(config: &Config, text: &str, k: usize) -> Result<Vec<SearchDocument>> {
    let pinecone = PineconeClient::new(config).context("Failed to initialize Pinecone client")?;
    let index = pinecone.open_index(&config.pinecone.index_name)?;
    let embedder = OpenAiClient::new(config).context("Failed to initialize OpenAI client")?;

    let results = similarity_search(&embedder, &index, text, k)?;
    for result in &results {
        println!("{}", result);
    }

    Ok(results)
}
