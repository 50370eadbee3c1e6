use super::*;
use crate::document::render_markdown;
use crate::testing::{FakeEmbedder, MemoryIndex};

fn record(id: i64, title: &str, description: &str) -> SolutionRecord {
    SolutionRecord {
        id,
        title: Some(title.to_string()),
        description_html: Some(format!("<p>{}</p>", description)),
        keywords: Some("erp,cloud".to_string()),
        link: Some(format!("https://www.findaso.com/ready-solution/{}", id)),
        ..SolutionRecord::default()
    }
}

#[test]
fn one_entry_per_record() {
    let embedder = FakeEmbedder::new(8);
    let index = MemoryIndex::default();
    let indexer = Indexer::new(&embedder, &index, MarkdownSplitter::default());

    let records = vec![
        record(1, "Foo", "First"),
        record(2, "Bar", "Second"),
        record(3, "Baz", "Third"),
    ];
    let stats = indexer.index_solutions(&records).expect("indexing should succeed");

    assert_eq!(
        stats,
        IndexingStats {
            records_processed: 3,
            chunks_uploaded: 3,
            overwritten_chunks: 0,
        }
    );
    assert_eq!(index.len(), 3);
    assert_eq!(embedder.calls(), 3);

    let entry = index.get("solution_2").expect("entry should exist");
    assert_eq!(entry.metadata.id, 2);
    assert_eq!(entry.metadata.title.as_deref(), Some("Bar"));
    assert_eq!(entry.metadata.text, render_markdown(&records[1]));
    assert_eq!(entry.values.len(), 8);
}

#[test]
fn later_chunks_overwrite_earlier_ones() {
    let embedder = FakeEmbedder::new(4);
    let index = MemoryIndex::default();
    let splitter = MarkdownSplitter::new(60, 0).expect("valid splitter");
    let indexer = Indexer::new(&embedder, &index, splitter.clone());

    let long = record(5, "Long", &"word ".repeat(40));
    let document = render_markdown(&long);
    let chunks: Vec<&str> = splitter.split(&document).collect();
    assert!(chunks.len() > 1);

    let stats = indexer
        .index_solutions(std::slice::from_ref(&long))
        .expect("indexing should succeed");

    assert_eq!(stats.chunks_uploaded, chunks.len());
    assert_eq!(stats.overwritten_chunks, chunks.len() - 1);
    assert_eq!(index.upserts(), chunks.len());
    assert_eq!(index.len(), 1);

    let entry = index.get("solution_5").expect("entry should exist");
    assert_eq!(Some(entry.metadata.text.as_str()), chunks.last().copied());
}

#[test]
fn reindexing_replaces_entries_in_place() {
    let embedder = FakeEmbedder::new(4);
    let index = MemoryIndex::default();
    let indexer = Indexer::new(&embedder, &index, MarkdownSplitter::default());

    indexer
        .index_solutions(&[record(1, "Foo", "Old text")])
        .expect("first run");
    indexer
        .index_solutions(&[record(1, "Foo", "New text")])
        .expect("second run");

    assert_eq!(index.len(), 1);
    let entry = index.get("solution_1").expect("entry should exist");
    assert!(entry.metadata.text.contains("New text"));
}

#[test]
fn first_failure_aborts_the_run() {
    let embedder = FakeEmbedder::new(4).failing_on("Bar");
    let index = MemoryIndex::default();
    let indexer = Indexer::new(&embedder, &index, MarkdownSplitter::default());

    let records = vec![
        record(1, "Foo", "First"),
        record(2, "Bar", "Second"),
        record(3, "Baz", "Third"),
    ];
    let message = format!(
        "{:#}",
        indexer
            .index_solutions(&records)
            .expect_err("embedding failure should abort")
    );

    assert!(message.contains("solution 2"), "{}", message);
    assert_eq!(index.len(), 1);
    assert!(index.get("solution_1").is_some());
    assert!(index.get("solution_3").is_none());
}

#[test]
fn untitled_record_is_indexed_without_title() {
    let embedder = FakeEmbedder::new(4);
    let index = MemoryIndex::default();
    let indexer = Indexer::new(&embedder, &index, MarkdownSplitter::default());

    let untitled = SolutionRecord {
        id: 9,
        ..SolutionRecord::default()
    };
    indexer
        .index_solutions(&[untitled])
        .expect("indexing should succeed");

    let entry = index.get("solution_9").expect("entry should exist");
    assert_eq!(entry.metadata.title, None);
    assert!(entry.metadata.text.starts_with("# None\n"));
}

#[test]
fn no_records_is_a_no_op() {
    let embedder = FakeEmbedder::new(4);
    let index = MemoryIndex::default();
    let indexer = Indexer::new(&embedder, &index, MarkdownSplitter::default());

    let stats = indexer.index_solutions(&[]).expect("empty run");

    assert_eq!(stats, IndexingStats::default());
    assert_eq!(embedder.calls(), 0);
    assert_eq!(index.upserts(), 0);
}

#[test]
fn embedder_and_index_dimensions_must_agree() {
    let embedder = FakeEmbedder::new(4);
    let index = MemoryIndex::with_dimension(8);
    let indexer = Indexer::new(&embedder, &index, MarkdownSplitter::default());

    let message = indexer
        .index_solutions(&[record(1, "Foo", "First")])
        .expect_err("mismatched dimensions should fail")
        .to_string();

    assert!(message.contains("8-dimensional"), "{}", message);
    assert_eq!(embedder.calls(), 0);
    assert_eq!(index.upserts(), 0);
}

#[test]
fn matching_dimensions_are_accepted() {
    let embedder = FakeEmbedder::new(4);
    let index = MemoryIndex::with_dimension(4);
    let indexer = Indexer::new(&embedder, &index, MarkdownSplitter::default());

    let stats = indexer
        .index_solutions(&[record(1, "Foo", "First")])
        .expect("indexing should succeed");
    assert_eq!(stats.chunks_uploaded, 1);
}
