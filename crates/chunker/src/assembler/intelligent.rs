//! Intelligent assembler: the smart accumulator made structure-aware.
//!
//! Tables stay atomic below 2.5× the ceiling and split by row beyond it,
//! header+separator repeated in every part. Section headers force a flush
//! once the accumulator is sufficiently full. Table-bearing documents
//! assemble against a doubled ceiling. Overflow consults the boundary
//! evaluator against the reconstructed full text; a materially better
//! nearby boundary is logged, not applied.

use tracing::debug;

use morsel_core::{CancelFlag, ChunkError, ChunkingOptions};

use crate::boundary::BoundaryEvaluator;
use crate::language::LanguageProfile;
use crate::overlap::OverlapManager;
use crate::units::SemanticUnit;

use super::smart::emit_oversize_unit;
use super::{
    completeness_of, flush, seed_from_previous, split_table_rows, Accumulator, RawChunk,
};

/// Tables stay atomic until they alone exceed this multiple of the ceiling.
const TABLE_SPLIT_FACTOR: f64 = 2.5;
/// An improved boundary must beat the current one by this much to be
/// worth reporting.
const MATERIAL_GAIN: f64 = 0.1;

#[allow(clippy::too_many_arguments)]
pub fn assemble_intelligent(
    units: &[SemanticUnit],
    text: &str,
    options: &ChunkingOptions,
    profile: &dyn LanguageProfile,
    evaluator: &BoundaryEvaluator,
    overlap: &OverlapManager,
    cancel: &CancelFlag,
) -> Result<Vec<RawChunk>, ChunkError> {
    let max = options.max_chunk_size;
    let has_tables = units.iter().any(|u| u.is_table());
    let assembly_max = options.effective_max_size(has_tables);
    let header_gate = max as f64 * options.header_fill_ratio;

    let mut out: Vec<RawChunk> = Vec::new();
    let mut acc = Accumulator::new();

    for unit in units {
        if unit.is_table() {
            if (unit.content.len() as f64) > max as f64 * TABLE_SPLIT_FACTOR {
                let completeness = completeness_of(&acc.content, Some(unit), options, profile);
                flush(&mut out, &mut acc, completeness, cancel)?;
                for part in split_table_rows(&unit.content, max) {
                    if cancel.is_cancelled() {
                        return Err(ChunkError::Cancelled);
                    }
                    out.push(RawChunk {
                        content: part,
                        start_char: unit.position,
                        end_char: unit.position + unit.content.len(),
                        overlap_len: 0,
                        completeness: 1.0,
                        importance: unit.importance,
                        has_table: true,
                        truncated: false,
                        table_split: true,
                    });
                }
            } else if !acc.is_empty() && acc.projected_len(unit) > assembly_max {
                let completeness = completeness_of(&acc.content, Some(unit), options, profile);
                flush(&mut out, &mut acc, completeness, cancel)?;
                seed_from_previous(&mut acc, &out, unit, overlap, options);
                acc.push(unit);
            } else {
                acc.push(unit);
            }
            continue;
        }

        if unit.is_section_header
            && options.separate_headers
            && !acc.is_empty()
            && acc.len() as f64 >= header_gate
        {
            let completeness = completeness_of(&acc.content, Some(unit), options, profile);
            flush(&mut out, &mut acc, completeness, cancel)?;
            seed_from_previous(&mut acc, &out, unit, overlap, options);
            acc.push(unit);
            continue;
        }

        if unit.content.len() > assembly_max {
            let completeness = completeness_of(&acc.content, Some(unit), options, profile);
            flush(&mut out, &mut acc, completeness, cancel)?;
            emit_oversize_unit(&mut out, unit, max, cancel)?;
            continue;
        }

        if !acc.is_empty() && acc.projected_len(unit) > assembly_max {
            consult_boundary(evaluator, text, unit.position, options);
            let completeness = completeness_of(&acc.content, Some(unit), options, profile);
            flush(&mut out, &mut acc, completeness, cancel)?;
            seed_from_previous(&mut acc, &out, unit, overlap, options);
        }
        acc.push(unit);
    }

    let completeness = completeness_of(&acc.content, None, options, profile);
    flush(&mut out, &mut acc, completeness, cancel)?;
    Ok(out)
}

/// Advisory boundary consult on overflow: evaluates the natural flush
/// point, searches nearby, and logs a materially better alternative.
/// The split itself is not moved.
fn consult_boundary(
    evaluator: &BoundaryEvaluator,
    text: &str,
    pos: usize,
    options: &ChunkingOptions,
) {
    let current = evaluator.evaluate(text, pos);
    let improved_pos = evaluator.improve(text, pos, options);
    if improved_pos == pos {
        return;
    }
    let improved = evaluator.evaluate(text, improved_pos);
    if improved.score > current.score + MATERIAL_GAIN {
        debug!(
            pos,
            improved_pos,
            current_score = current.score,
            improved_score = improved.score,
            reason = %improved.reason,
            "materially better boundary nearby (advisory, not applied)"
        );
    }
}
