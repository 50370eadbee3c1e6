
use std::iter::FusedIterator;

use anyhow::Result;
use pulldown_cmark::{Event, Parser, Tag};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for content chunking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Characters repeated from the end of one chunk at the start of the next
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        // Large enough that a rendered solution always fits in one chunk
        Self {
            chunk_size: 10_000,
            chunk_overlap: 0,
        }
    }
}

/// Splits Markdown into size-bounded chunks, preferring structural boundaries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl MarkdownSplitter {
    #[inline]
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        anyhow::ensure!(chunk_size > 0, "chunk size must be at least 1");
        anyhow::ensure!(
            chunk_overlap < chunk_size,
            "chunk overlap ({}) must be smaller than chunk size ({})",
            chunk_overlap,
            chunk_size
        );
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    #[inline]
    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Lazily split `text` into chunks in document order.
    ///
    /// Calling this again (or cloning the returned iterator) restarts from
    /// the beginning. With zero overlap the chunks concatenate back to `text`.
    #[inline]
    pub fn split<'t>(&self, text: &'t str) -> Chunks<'t> {
        let boundaries = BlockBoundaries::scan(text);
        debug!(
            "Scanned {} headings and {} blocks in {} bytes of markdown",
            boundaries.headings.len(),
            boundaries.blocks.len(),
            text.len()
        );

        Chunks {
            text,
            boundaries,
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            position: 0,
            emitted_end: 0,
        }
    }
}

impl Default for MarkdownSplitter {
    #[inline]
    fn default() -> Self {
        let config = ChunkingConfig::default();
        Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
        }
    }
}

/// Byte offsets where top-level Markdown blocks start, ascending
#[derive(Debug, Clone, Default)]
struct BlockBoundaries {
    headings: Vec<usize>,
    blocks: Vec<usize>,
}

impl BlockBoundaries {
    fn scan(text: &str) -> Self {
        let mut boundaries = Self::default();
        let mut depth = 0usize;

        for (event, range) in Parser::new(text).into_offset_iter() {
            match event {
                Event::Start(tag) => {
                    if depth == 0 {
                        if matches!(tag, Tag::Heading { .. }) {
                            boundaries.headings.push(range.start);
                        } else {
                            boundaries.blocks.push(range.start);
                        }
                    }
                    depth += 1;
                }
                Event::End(_) => depth = depth.saturating_sub(1),
                Event::Rule if depth == 0 => boundaries.blocks.push(range.start),
                _ => {}
            }
        }

        boundaries
    }
}

/// Iterator over the chunks of one document
#[derive(Debug, Clone)]
pub struct Chunks<'t> {
    text: &'t str,
    boundaries: BlockBoundaries,
    chunk_size: usize,
    chunk_overlap: usize,
    position: usize,
    /// End of the last chunk handed out; the next one must end past it
    emitted_end: usize,
}

impl<'t> Chunks<'t> {
    /// Pick the split point in `(floor, window_end]`, best boundary kind first
    fn split_point(&self, floor: usize, window_end: usize) -> usize {
        let structural = [&self.boundaries.headings, &self.boundaries.blocks];
        for offsets in structural {
            if let Some(offset) = last_between(offsets, floor, window_end) {
                return offset;
            }
        }

        let window = &self.text[floor..window_end];

        if let Some(newline) = window.rfind('\n') {
            return floor + newline + 1;
        }

        if let Some((idx, ch)) = window.char_indices().rev().find(|(_, c)| c.is_whitespace()) {
            return floor + idx + ch.len_utf8();
        }

        window_end
    }

    /// Where the chunk after `[start, end)` begins
    fn next_start(&self, start: usize, end: usize) -> usize {
        if self.chunk_overlap == 0 {
            return end;
        }

        self.text[..end]
            .char_indices()
            .rev()
            .nth(self.chunk_overlap - 1)
            .map(|(idx, _)| idx)
            .filter(|&idx| idx > start)
            .unwrap_or(end)
    }
}

impl<'t> Iterator for Chunks<'t> {
    type Item = &'t str;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.position;
        if start >= self.text.len() {
            return None;
        }

        let rest = &self.text[start..];
        let Some((window_len, _)) = rest.char_indices().nth(self.chunk_size) else {
            self.position = self.text.len();
            self.emitted_end = self.text.len();
            return Some(rest);
        };

        // With overlap the window starts inside the previous chunk, so only
        // split points past its end yield new content
        let floor = start.max(self.emitted_end);
        let end = self.split_point(floor, start + window_len);
        self.position = self.next_start(start, end);
        self.emitted_end = end;
        Some(&self.text[start..end])
    }
}

impl FusedIterator for Chunks<'_> {}

/// Largest offset in `sorted` that lies in `(start, end]`
fn last_between(sorted: &[usize], start: usize, end: usize) -> Option<usize> {
    let idx = sorted.partition_point(|&offset| offset <= end);
    idx.checked_sub(1)
        .map(|i| sorted[i])
        .filter(|&offset| offset > start)
}
