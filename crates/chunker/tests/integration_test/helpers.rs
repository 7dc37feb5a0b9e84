use morsel_chunker::{
    ChunkingEngine, ChunkingOptions, ChunkingStrategy, DocumentChunk, DocumentContent,
};

/// Engine with explicit sizes, overlap disabled unless asked for.
pub fn engine(max: usize, min: usize, overlap: usize, strategy: ChunkingStrategy) -> ChunkingEngine {
    ChunkingEngine::new(ChunkingOptions {
        max_chunk_size: max,
        min_chunk_size: min,
        overlap_size: overlap,
        strategy,
        ..ChunkingOptions::default()
    })
    .unwrap()
}

/// Multi-paragraph prose document, every paragraph well over 100 chars.
pub fn prose_document() -> DocumentContent {
    let mut text = String::new();
    for i in 0..8 {
        text.push_str(&format!(
            "Paragraph number {i} opens with a proper topic sentence about the system under test. \
             It continues with supporting detail that pads the paragraph well past the merge threshold. \
             A third sentence closes paragraph {i} cleanly.\n\n"
        ));
    }
    DocumentContent::from_text(text)
}

/// Markdown document with headings, a list, and a small table.
pub fn structured_document() -> DocumentContent {
    DocumentContent::from_text(
        "# Overview\n\
         The engine splits documents into bounded chunks. Each chunk keeps its sentences whole.\n\n\
         ## Inputs\n\
         The following inputs are required:\n\
         - the raw text\n\
         - the size options\n\
         - a language code\n\n\
         ## Limits\n\
         | setting | value |\n\
         |---------|-------|\n\
         | max     | 1000  |\n\
         | min     | 100   |\n\n\
         The limits table above drives enforcement. Nothing else does.\n",
    )
}

/// All whitespace removed, for round-trip comparison.
pub fn squash(text: &str) -> String {
    text.split_whitespace().collect()
}

/// Overlap prefix length recorded on a chunk.
pub fn overlap_len(chunk: &DocumentChunk) -> usize {
    chunk.overlap_len()
}
