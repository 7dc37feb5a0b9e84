use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::options::ChunkingStrategy;

/// Well-known keys in [`DocumentChunk::props`]. Downstream consumers read
/// these; the engine never reads them back.
pub mod props {
    pub const COMPLETENESS: &str = "quality.completeness";
    pub const INDEPENDENCE: &str = "quality.independence";
    pub const DENSITY: &str = "quality.density";
    pub const SHARPNESS: &str = "quality.sharpness";
    pub const PREV_CHUNK_ID: &str = "prev_chunk_id";
    pub const NEXT_CHUNK_ID: &str = "next_chunk_id";
    pub const TOTAL_CHUNKS: &str = "total_chunks";
    /// Character count of the overlap prefix copied from the previous chunk.
    pub const OVERLAP_LEN: &str = "overlap_len";
    /// Set when an atomic unit could not be split below the size ceiling.
    pub const TRUNCATED: &str = "truncated";
    /// Set on every part of a row-split table.
    pub const TABLE_SPLIT: &str = "table_split";
    /// Hint for downstream hybrid-search/embedding collaborators.
    pub const SEARCH_HINT: &str = "search_hint";
}

/// Where a chunk came from in the source document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkLocation {
    pub start_char: usize,
    pub end_char: usize,
    /// Section titles containing the chunk start, outermost first.
    pub heading_path: Vec<String>,
    /// 1-based page numbers the chunk spans.
    pub pages: Vec<usize>,
}

/// A bounded-size span of document text emitted for retrieval/embedding.
///
/// Built once by the pipeline; only the finalizer touches it afterwards to
/// wire prev/next links and totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: String,
    pub content: String,
    /// 0-based ordinal within the document, contiguous.
    pub index: usize,
    pub location: ChunkLocation,
    /// Whitespace-token estimate of the content.
    pub token_estimate: usize,
    /// Weighted overall quality score in [0, 1].
    pub quality: f64,
    /// Mean importance of the semantic units folded in.
    pub importance: f64,
    /// Information density sub-score in [0, 1].
    pub density: f64,
    pub strategy: ChunkingStrategy,
    /// Open map of quality sub-scores, link bookkeeping, and pass-through
    /// hint fields. Insertion-ordered for stable serialization.
    pub props: IndexMap<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl DocumentChunk {
    /// Fresh chunk with a random id and empty props.
    pub fn new(content: String, index: usize, strategy: ChunkingStrategy) -> Self {
        let token_estimate = content.split_whitespace().count();
        Self {
            id: Uuid::new_v4().to_string(),
            content,
            index,
            location: ChunkLocation::default(),
            token_estimate,
            quality: 0.0,
            importance: 0.0,
            density: 0.0,
            strategy,
            props: IndexMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Overlap prefix length recorded by the assembler, 0 if absent.
    pub fn overlap_len(&self) -> usize {
        self.props
            .get(props::OVERLAP_LEN)
            .and_then(Value::as_u64)
            .unwrap_or(0) as usize
    }

    /// Content with the duplicated overlap prefix removed.
    pub fn novel_content(&self) -> &str {
        &self.content[self.overlap_len().min(self.content.len())..]
    }

    pub fn is_truncated(&self) -> bool {
        self.props
            .get(props::TRUNCATED)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// Run-level summary computed by the finalizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingStatistics {
    pub total_chunks: usize,
    pub average_chunk_size: f64,
    pub min_chunk_size: usize,
    pub max_chunk_size: usize,
    pub average_quality: f64,
    pub processing_time_ms: u64,
    pub strategy: ChunkingStrategy,
}

/// Ordered chunk list plus statistics for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingResult {
    pub chunks: Vec<DocumentChunk>,
    pub statistics: ChunkingStatistics,
}
