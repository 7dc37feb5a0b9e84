use morsel_chunker::{ChunkingStrategy, DocumentContent};

use crate::helpers::{engine, overlap_len, prose_document, squash, structured_document};

#[test]
fn every_chunk_respects_the_effective_ceiling() {
    for strategy in [ChunkingStrategy::Smart, ChunkingStrategy::Intelligent] {
        let e = engine(1000, 100, 100, strategy);
        let result = e.chunk(&prose_document()).unwrap();
        assert!(!result.chunks.is_empty());
        for c in &result.chunks {
            assert!(
                c.content.len() <= 1000 || c.is_truncated(),
                "{strategy}: oversize unflagged chunk of {} chars",
                c.content.len()
            );
        }
    }
}

#[test]
fn overlap_prefix_is_a_verbatim_suffix_of_the_previous_chunk() {
    for strategy in [ChunkingStrategy::Smart, ChunkingStrategy::Intelligent] {
        let e = engine(400, 50, 80, strategy);
        let result = e.chunk(&prose_document()).unwrap();
        assert!(result.chunks.len() > 1, "{strategy}: need multiple chunks");
        for pair in result.chunks.windows(2) {
            let len = overlap_len(&pair[1]);
            if len == 0 {
                continue;
            }
            let prefix = &pair[1].content[..len];
            assert!(
                pair[0].content.ends_with(prefix),
                "{strategy}: overlap {prefix:?} not a suffix of the previous chunk"
            );
        }
    }
}

#[test]
fn table_rows_appear_exactly_once_in_order() {
    let mut text = String::from("| id | name |\n|----|------|");
    for i in 0..40 {
        text.push_str(&format!("\n| {i:03} | item_number_{i:03} |"));
    }
    let e = engine(200, 20, 0, ChunkingStrategy::Intelligent);
    let result = e.chunk(&DocumentContent::from_text(text)).unwrap();

    let mut data_rows = Vec::new();
    for c in &result.chunks {
        for line in c.content.lines() {
            if line.starts_with("| 0") {
                data_rows.push(line.to_string());
            }
        }
    }
    let expected: Vec<String> = (0..40)
        .map(|i| format!("| {i:03} | item_number_{i:03} |"))
        .collect();
    assert_eq!(data_rows, expected);
}

#[test]
fn identical_input_and_options_give_identical_boundaries() {
    let doc = structured_document();
    for strategy in [ChunkingStrategy::Smart, ChunkingStrategy::Intelligent] {
        let a = engine(300, 50, 60, strategy).chunk(&doc).unwrap();
        let b = engine(300, 50, 60, strategy).chunk(&doc).unwrap();
        let contents_a: Vec<&str> = a.chunks.iter().map(|c| c.content.as_str()).collect();
        let contents_b: Vec<&str> = b.chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents_a, contents_b, "{strategy}: boundaries drifted");
        let spans_a: Vec<(usize, usize)> = a
            .chunks
            .iter()
            .map(|c| (c.location.start_char, c.location.end_char))
            .collect();
        let spans_b: Vec<(usize, usize)> = b
            .chunks
            .iter()
            .map(|c| (c.location.start_char, c.location.end_char))
            .collect();
        assert_eq!(spans_a, spans_b);
    }
}

#[test]
fn stripping_overlaps_reconstructs_the_source() {
    let doc = prose_document();
    for strategy in [ChunkingStrategy::Smart, ChunkingStrategy::Intelligent] {
        let e = engine(500, 50, 80, strategy);
        let result = e.chunk(&doc).unwrap();
        let rebuilt: String = result
            .chunks
            .iter()
            .map(|c| {
                let novel = c.novel_content();
                format!("{novel} ")
            })
            .collect();
        assert_eq!(
            squash(&rebuilt),
            squash(&doc.text),
            "{strategy}: round trip lost or duplicated text"
        );
    }
}

#[test]
fn ordinals_are_contiguous_across_both_strategies() {
    for strategy in [ChunkingStrategy::Smart, ChunkingStrategy::Intelligent] {
        let result = engine(300, 50, 0, strategy).chunk(&prose_document()).unwrap();
        for (i, c) in result.chunks.iter().enumerate() {
            assert_eq!(c.index, i);
        }
    }
}
