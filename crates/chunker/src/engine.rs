//! Pipeline orchestration: scanner → extractor → assembler → optimizer →
//! scorer → finalizer, plus the rayon fan-out over independent documents.

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use serde_json::json;
use tracing::info;

use morsel_core::{
    props, CancelFlag, ChunkError, ChunkingOptions, ChunkingResult, ChunkingStatistics,
    ChunkingStrategy, DocumentChunk, DocumentContent,
};

use crate::assembler::{self, RawChunk};
use crate::boundary::BoundaryEvaluator;
use crate::language::{profile_for, LanguageProfile};
use crate::optimizer;
use crate::overlap::OverlapManager;
use crate::quality::QualityScorer;
use crate::structure;
use crate::units;

/// One configured chunking pipeline. All services hold only immutable
/// state; a single engine can chunk documents from many threads.
pub struct ChunkingEngine {
    options: ChunkingOptions,
    profile: Arc<dyn LanguageProfile>,
    evaluator: BoundaryEvaluator,
    overlap: OverlapManager,
    scorer: QualityScorer,
}

impl ChunkingEngine {
    /// Validates the options and wires up the language-bound services.
    pub fn new(options: ChunkingOptions) -> Result<Self, ChunkError> {
        options.validate()?;
        let profile = profile_for(&options.language);
        let evaluator = BoundaryEvaluator::new(Arc::clone(&profile));
        Ok(Self {
            options,
            profile,
            evaluator,
            overlap: OverlapManager::new(),
            scorer: QualityScorer::new(),
        })
    }

    pub fn options(&self) -> &ChunkingOptions {
        &self.options
    }

    /// Chunk one document to completion.
    pub fn chunk(&self, document: &DocumentContent) -> Result<ChunkingResult, ChunkError> {
        self.chunk_with_cancel(document, &CancelFlag::new())
    }

    /// Chunk one document, checking `cancel` once per emitted chunk. A
    /// cancelled run returns [`ChunkError::Cancelled`] and no chunks.
    pub fn chunk_with_cancel(
        &self,
        document: &DocumentContent,
        cancel: &CancelFlag,
    ) -> Result<ChunkingResult, ChunkError> {
        let started = Instant::now();

        // Blank input short-circuits to an empty result, not an error.
        if document.text.trim().is_empty() {
            return Ok(empty_result(self.options.strategy, started));
        }

        let structure = structure::scan(&document.text);
        let units = units::extract_units(&document.text, &structure, self.profile.as_ref());
        if units.is_empty() {
            return Ok(empty_result(self.options.strategy, started));
        }
        let has_tables = units.iter().any(|u| u.is_table());

        let raw = assembler::assemble(
            &units,
            &document.text,
            &self.options,
            self.profile.as_ref(),
            &self.evaluator,
            &self.overlap,
            cancel,
        )?;
        let raw = optimizer::optimize(raw, &self.options, has_tables, self.profile.as_ref());
        if cancel.is_cancelled() {
            return Err(ChunkError::Cancelled);
        }

        let chunks = self.finalize(raw, document, &structure);
        let statistics = compute_statistics(&chunks, self.options.strategy, started);
        info!(
            chunks = chunks.len(),
            strategy = %self.options.strategy,
            elapsed_ms = statistics.processing_time_ms,
            "document chunked"
        );
        Ok(ChunkingResult { chunks, statistics })
    }

    /// Chunk independent documents in parallel. Fails fast on the first
    /// error.
    pub fn chunk_documents(
        &self,
        documents: &[DocumentContent],
    ) -> Result<Vec<ChunkingResult>, ChunkError> {
        documents.par_iter().map(|d| self.chunk(d)).collect()
    }

    /// Build the final chunk entities: ordinals, quality scores, location
    /// resolution, and the prev/next linking pass.
    fn finalize(
        &self,
        raw: Vec<RawChunk>,
        document: &DocumentContent,
        structure: &structure::DocumentStructure,
    ) -> Vec<DocumentChunk> {
        let strategy = self.options.strategy;
        let mut chunks: Vec<DocumentChunk> = raw
            .into_iter()
            .enumerate()
            .map(|(index, rc)| {
                let scores = self.scorer.score(&rc.content);
                let mut chunk = DocumentChunk::new(rc.content, index, strategy);
                chunk.location.start_char = rc.start_char;
                chunk.location.end_char = rc.end_char;
                // The supplied section outline wins; scanned markdown
                // headings fill in when the caller provides none.
                chunk.location.heading_path = if document.sections.is_empty() {
                    structure.heading_path_at(rc.start_char)
                } else {
                    document.heading_path_at(rc.start_char)
                };
                chunk.location.pages = document.pages_for(rc.start_char, rc.end_char);
                chunk.quality = scores.overall;
                chunk.importance = rc.importance;
                chunk.density = scores.density;

                chunk
                    .props
                    .insert(props::COMPLETENESS.to_string(), json!(scores.completeness));
                chunk
                    .props
                    .insert(props::INDEPENDENCE.to_string(), json!(scores.independence));
                chunk
                    .props
                    .insert(props::DENSITY.to_string(), json!(scores.density));
                chunk
                    .props
                    .insert(props::SHARPNESS.to_string(), json!(scores.sharpness));
                if rc.overlap_len > 0 {
                    chunk
                        .props
                        .insert(props::OVERLAP_LEN.to_string(), json!(rc.overlap_len as u64));
                }
                if rc.truncated {
                    chunk.props.insert(props::TRUNCATED.to_string(), json!(true));
                }
                if rc.table_split {
                    chunk
                        .props
                        .insert(props::TABLE_SPLIT.to_string(), json!(true));
                }

                // Informational hints for downstream search/embedding
                // collaborators; never read back here.
                let hint = match strategy {
                    ChunkingStrategy::Smart => json!({
                        "assembler_completeness": rc.completeness,
                    }),
                    ChunkingStrategy::Intelligent => json!({
                        "has_table": rc.has_table,
                        "heading": chunk.location.heading_path.last(),
                    }),
                };
                chunk.props.insert(props::SEARCH_HINT.to_string(), hint);
                chunk
            })
            .collect();

        // Cross-chunk linking: the only mutation after construction.
        let total = chunks.len();
        let ids: Vec<String> = chunks.iter().map(|c| c.id.clone()).collect();
        for (i, chunk) in chunks.iter_mut().enumerate() {
            chunk
                .props
                .insert(props::TOTAL_CHUNKS.to_string(), json!(total));
            if i > 0 {
                chunk
                    .props
                    .insert(props::PREV_CHUNK_ID.to_string(), json!(ids[i - 1]));
            }
            if i + 1 < total {
                chunk
                    .props
                    .insert(props::NEXT_CHUNK_ID.to_string(), json!(ids[i + 1]));
            }
        }
        chunks
    }
}

fn empty_result(strategy: ChunkingStrategy, started: Instant) -> ChunkingResult {
    ChunkingResult {
        chunks: Vec::new(),
        statistics: ChunkingStatistics {
            total_chunks: 0,
            average_chunk_size: 0.0,
            min_chunk_size: 0,
            max_chunk_size: 0,
            average_quality: 0.0,
            processing_time_ms: started.elapsed().as_millis() as u64,
            strategy,
        },
    }
}

fn compute_statistics(
    chunks: &[DocumentChunk],
    strategy: ChunkingStrategy,
    started: Instant,
) -> ChunkingStatistics {
    let total = chunks.len();
    let sizes: Vec<usize> = chunks.iter().map(|c| c.content.len()).collect();
    let average_chunk_size = if total > 0 {
        sizes.iter().sum::<usize>() as f64 / total as f64
    } else {
        0.0
    };
    let average_quality = if total > 0 {
        chunks.iter().map(|c| c.quality).sum::<f64>() / total as f64
    } else {
        0.0
    };
    ChunkingStatistics {
        total_chunks: total,
        average_chunk_size,
        min_chunk_size: sizes.iter().min().copied().unwrap_or(0),
        max_chunk_size: sizes.iter().max().copied().unwrap_or(0),
        average_quality,
        processing_time_ms: started.elapsed().as_millis() as u64,
        strategy,
    }
}
