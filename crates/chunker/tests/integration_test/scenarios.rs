use morsel_chunker::{
    CancelFlag, ChunkError, ChunkingEngine, ChunkingOptions, ChunkingStrategy, DocumentContent,
};
use morsel_core::{props, PageRange, Section};

use crate::helpers::engine;

#[test]
fn three_sentences_fit_one_chunk_without_a_forced_split() {
    let e = engine(100, 10, 0, ChunkingStrategy::Smart);
    let result = e.chunk(&DocumentContent::from_text("A. B. C.")).unwrap();
    assert_eq!(result.chunks.len(), 1);
    assert_eq!(result.chunks[0].content, "A. B. C.");
}

#[test]
fn fifty_row_table_splits_with_header_in_every_part() {
    let mut text = String::from("| key_col | value_col |\n|---------|-----------|");
    for i in 0..50 {
        text.push_str(&format!("\n| k_{i:02}_xxxxx | v_{i:02}_yyyyy |"));
    }
    let e = engine(200, 20, 0, ChunkingStrategy::Intelligent);
    let result = e.chunk(&DocumentContent::from_text(text)).unwrap();

    assert!(result.chunks.len() > 1);
    for c in &result.chunks {
        assert!(
            c.content.starts_with("| key_col | value_col |\n|---------|-----------|"),
            "part missing header: {:?}",
            c.content.lines().next()
        );
        let data_rows = c.content.lines().count() - 2;
        assert!(data_rows <= 5, "part carries {data_rows} rows");
        assert_eq!(c.props[props::TABLE_SPLIT], serde_json::json!(true));
    }
}

#[test]
fn trailing_fragment_is_not_merged_when_the_result_ends_mid_sentence() {
    // A full paragraph followed by a short fragment with no terminal
    // punctuation: merging would end mid-sentence, so it stays standalone.
    let text = "The leading paragraph is long enough to stand alone as a chunk and it finishes with a proper terminal sentence end.\n\nforty characters of dangling fragment text";
    let e = engine(130, 100, 0, ChunkingStrategy::Smart);
    let result = e.chunk(&DocumentContent::from_text(text)).unwrap();
    assert_eq!(result.chunks.len(), 2);
    assert!(result.chunks[1].content.contains("dangling fragment"));
}

#[test]
fn run_on_sentence_parts_carry_truncation_markers() {
    let sentence = format!(
        "{} and the thought never lands anywhere",
        "first the point meanders, then it doubles back, next it wanders off, ".repeat(4)
    );
    assert!(sentence.len() > 300);
    let e = engine(100, 10, 0, ChunkingStrategy::Smart);
    let result = e.chunk(&DocumentContent::from_text(sentence)).unwrap();
    assert!(result.chunks.len() >= 3);
    let (last, firsts) = result.chunks.split_last().unwrap();
    for c in firsts {
        assert!(c.is_truncated(), "non-final part lost its marker");
    }
    assert!(!last.is_truncated());
}

#[test]
fn heading_path_and_pages_resolve_from_the_supplied_outline() {
    let text = "Chapter body text with one complete sentence sits right here.";
    let doc = DocumentContent {
        text: text.to_string(),
        metadata: Default::default(),
        sections: vec![
            Section {
                title: "Guide".to_string(),
                level: 1,
                start_char: 0,
                end_char: text.len(),
            },
            Section {
                title: "Setup".to_string(),
                level: 2,
                start_char: 0,
                end_char: text.len(),
            },
        ],
        pages: vec![PageRange {
            page_number: 3,
            start_char: 0,
            end_char: text.len(),
        }],
    };
    let e = engine(200, 10, 0, ChunkingStrategy::Intelligent);
    let result = e.chunk(&doc).unwrap();
    assert_eq!(result.chunks.len(), 1);
    let loc = &result.chunks[0].location;
    assert_eq!(loc.heading_path, vec!["Guide", "Setup"]);
    assert_eq!(loc.pages, vec![3]);
}

#[test]
fn heading_path_falls_back_to_scanned_markdown_headings() {
    // No section outline supplied: the structural scan provides the path.
    let e = engine(300, 50, 0, ChunkingStrategy::Intelligent);
    let result = e.chunk(&crate::helpers::structured_document()).unwrap();
    let inputs_chunk = result
        .chunks
        .iter()
        .find(|c| c.content.contains("## Inputs"))
        .expect("a chunk should carry the Inputs section");
    assert_eq!(
        inputs_chunk.location.heading_path,
        vec!["Overview", "Inputs"]
    );
}

#[test]
fn unknown_strategy_name_is_rejected_not_defaulted() {
    let err = "legacy_recursive".parse::<ChunkingStrategy>().unwrap_err();
    assert!(matches!(err, ChunkError::UnknownStrategy(_)));
}

#[test]
fn cancelled_run_returns_no_partial_chunks() {
    let cancel = CancelFlag::new();
    cancel.cancel();
    let e = engine(100, 10, 0, ChunkingStrategy::Intelligent);
    let err = e
        .chunk_with_cancel(
            &DocumentContent::from_text("Sentence one lives here. Sentence two follows it."),
            &cancel,
        )
        .unwrap_err();
    assert!(matches!(err, ChunkError::Cancelled));
}

#[test]
fn deduplication_collapses_near_identical_neighbors() {
    let options = ChunkingOptions {
        max_chunk_size: 120,
        min_chunk_size: 10,
        overlap_size: 0,
        deduplicate_overlaps: true,
        strategy: ChunkingStrategy::Smart,
        ..ChunkingOptions::default()
    };
    let with_dedup = ChunkingEngine::new(options.clone()).unwrap();
    let without_dedup = ChunkingEngine::new(ChunkingOptions {
        deduplicate_overlaps: false,
        ..options
    })
    .unwrap();

    // Four identical lines assemble into two identical chunks; the dedup
    // pass drops the second entirely.
    let line = "Alpha shared sentence body repeats across chunks.";
    let text = format!("{line}\n{line}\n{line}\n{line}");
    let doc = DocumentContent::from_text(text);
    let deduped = with_dedup.chunk(&doc).unwrap();
    let plain = without_dedup.chunk(&doc).unwrap();
    assert!(plain.chunks.len() >= 2);
    assert!(deduped.chunks.len() < plain.chunks.len());
}

#[test]
fn statistics_reflect_the_emitted_chunks() {
    let e = engine(300, 50, 0, ChunkingStrategy::Intelligent);
    let result = e
        .chunk(&crate::helpers::structured_document())
        .unwrap();
    let stats = &result.statistics;
    assert_eq!(stats.total_chunks, result.chunks.len());
    assert_eq!(stats.strategy, ChunkingStrategy::Intelligent);
    let max = result.chunks.iter().map(|c| c.content.len()).max().unwrap();
    assert_eq!(stats.max_chunk_size, max);
    assert!(stats.average_quality > 0.0);
}
