// Indexer module
// Drives ingestion: render each solution, chunk it, embed the chunks and upsert them

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::FindasoError;
use crate::database::pinecone::{EntryMetadata, IndexEntry, VectorIndex};
use crate::database::sql::SolutionRecord;
use crate::document::{DocumentRenderer, HtmlParagraphs, ParagraphExtractor};
use crate::embeddings::{Embedder, MarkdownSplitter};

/// Counters for one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexingStats {
    pub records_processed: usize,
    pub chunks_uploaded: usize,
    /// Chunks replaced by a later chunk of the same record
    pub overwritten_chunks: usize,
}

/// Sequential ingestion over an already opened index
pub struct Indexer<'a, E: ?Sized, V: ?Sized, P = HtmlParagraphs> {
    embedder: &'a E,
    index: &'a V,
    splitter: MarkdownSplitter,
    renderer: DocumentRenderer<P>,
}

impl<'a, E, V> Indexer<'a, E, V, HtmlParagraphs>
where
    E: Embedder + ?Sized,
    V: VectorIndex + ?Sized,
{
    #[inline]
    pub fn new(embedder: &'a E, index: &'a V, splitter: MarkdownSplitter) -> Self {
        Self::with_renderer(
            embedder,
            index,
            splitter,
            DocumentRenderer::new(HtmlParagraphs),
        )
    }
}

impl<'a, E, V, P> Indexer<'a, E, V, P>
where
    E: Embedder + ?Sized,
    V: VectorIndex + ?Sized,
    P: ParagraphExtractor,
{
    #[inline]
    pub fn with_renderer(
        embedder: &'a E,
        index: &'a V,
        splitter: MarkdownSplitter,
        renderer: DocumentRenderer<P>,
    ) -> Self {
        Self {
            embedder,
            index,
            splitter,
            renderer,
        }
    }

    /// Index every record in order.
    ///
    /// Stops at the first failure; records before it stay in the index.
    pub fn index_solutions(&self, records: &[SolutionRecord]) -> Result<IndexingStats> {
        self.check_dimensions()?;

        info!("Indexing {} solutions", records.len());
        let mut stats = IndexingStats::default();

        for record in records {
            self.index_record(record, &mut stats)
                .with_context(|| format!("Failed to index solution {}", record.id))?;
            stats.records_processed += 1;
        }

        info!(
            "Indexed {} solutions ({} chunks uploaded, {} overwritten)",
            stats.records_processed, stats.chunks_uploaded, stats.overwritten_chunks
        );
        Ok(stats)
    }

    fn check_dimensions(&self) -> Result<(), FindasoError> {
        match self.index.dimension() {
            Some(expected) if expected != self.embedder.dimension() => {
                Err(FindasoError::VectorStore(format!(
                    "Index expects {}-dimensional vectors but the embedder produces {}",
                    expected,
                    self.embedder.dimension()
                )))
            }
            _ => Ok(()),
        }
    }

    fn index_record(&self, record: &SolutionRecord, stats: &mut IndexingStats) -> Result<()> {
        let document = self.renderer.render(record);
        let chunks = self.splitter.split(&document);
        let vector_id = record.vector_id();

        // Every chunk shares the record's key, so only the last one survives
        let parts = chunks.clone().count();
        if parts > 1 {
            warn!(
                "Solution {} split into {} chunks under '{}'; only the last part stays in the index",
                record.id, parts, vector_id
            );
            stats.overwritten_chunks += parts - 1;
        }

        for (n, chunk) in chunks.enumerate() {
            let part = n + 1;
            debug!(
                "Embedding part {} of solution {} ({} chars)",
                part,
                record.id,
                chunk.chars().count()
            );

            let values = self
                .embedder
                .embed(chunk)
                .with_context(|| format!("Failed to embed part {}", part))?;

            let entry = IndexEntry {
                id: vector_id.clone(),
                values,
                metadata: EntryMetadata {
                    title: record.title.clone(),
                    id: record.id,
                    text: chunk.to_string(),
                },
            };
            self.index
                .upsert(&entry)
                .with_context(|| format!("Failed to upload part {}", part))?;

            println!(
                "Uploaded embedding for '{}' - part {}",
                record.display_title(),
                part
            );
            stats.chunks_uploaded += 1;
        }

        Ok(())
    }
}
