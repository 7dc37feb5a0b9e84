//! Smart assembler: folds units into a running chunk until the size gate
//! trips with acceptable completeness, splitting oversize sentences at
//! clause punctuation and then word boundaries.

use tracing::debug;

use morsel_core::{CancelFlag, ChunkError, ChunkingOptions};

use crate::language::LanguageProfile;
use crate::overlap::OverlapManager;
use crate::units::SemanticUnit;

use super::{
    completeness_of, flush, seed_from_previous, split_oversized_unit, split_table_rows,
    Accumulator, RawChunk,
};

/// Minimum accumulator completeness before a size-triggered flush.
const COMPLETENESS_THRESHOLD: f64 = 0.70;
/// Fill fraction past which the flush happens regardless of completeness.
const FORCED_FLUSH_FILL: f64 = 0.90;
/// Tables stay atomic until they alone exceed this multiple of the ceiling.
const TABLE_SPLIT_FACTOR: f64 = 2.5;

pub fn assemble_smart(
    units: &[SemanticUnit],
    options: &ChunkingOptions,
    profile: &dyn LanguageProfile,
    overlap: &OverlapManager,
    cancel: &CancelFlag,
) -> Result<Vec<RawChunk>, ChunkError> {
    let max = options.max_chunk_size;
    let mut out: Vec<RawChunk> = Vec::new();
    let mut acc = Accumulator::new();

    for unit in units {
        if unit.content.len() > max {
            let completeness = completeness_of(&acc.content, Some(unit), options, profile);
            flush(&mut out, &mut acc, completeness, cancel)?;
            emit_oversize_unit(&mut out, unit, max, cancel)?;
            continue;
        }

        if !acc.is_empty() && acc.projected_len(unit) > max {
            let completeness = completeness_of(&acc.content, Some(unit), options, profile);
            let fill = acc.len() as f64 / max as f64;
            if completeness >= COMPLETENESS_THRESHOLD || fill >= FORCED_FLUSH_FILL {
                flush(&mut out, &mut acc, completeness, cancel)?;
                seed_from_previous(&mut acc, &out, unit, overlap, options);
            } else {
                // Keep folding past the ceiling; the optimizer's hard
                // enforcement pass resplits later.
                debug!(
                    len = acc.len(),
                    completeness,
                    "size gate hit below completeness threshold, folding on"
                );
            }
        }
        acc.push(unit);
    }

    let completeness = completeness_of(&acc.content, None, options, profile);
    flush(&mut out, &mut acc, completeness, cancel)?;
    Ok(out)
}

/// Fallback for a single unit past the ceiling: tables stay whole below
/// the split factor (then go row-wise), text goes sentence → clause →
/// word. Each emitted part checks cancellation.
pub(super) fn emit_oversize_unit(
    out: &mut Vec<RawChunk>,
    unit: &SemanticUnit,
    budget: usize,
    cancel: &CancelFlag,
) -> Result<(), ChunkError> {
    let span_end = unit.position + unit.content.len();

    if unit.is_table() {
        if (unit.content.len() as f64) > budget as f64 * TABLE_SPLIT_FACTOR {
            for part in split_table_rows(&unit.content, budget) {
                if cancel.is_cancelled() {
                    return Err(ChunkError::Cancelled);
                }
                out.push(RawChunk {
                    content: part,
                    start_char: unit.position,
                    end_char: span_end,
                    overlap_len: 0,
                    completeness: 1.0,
                    importance: unit.importance,
                    has_table: true,
                    truncated: false,
                    table_split: true,
                });
            }
        } else {
            if cancel.is_cancelled() {
                return Err(ChunkError::Cancelled);
            }
            // Atomic oversize table: emitted whole, the optimizer decides
            // against the effective ceiling.
            out.push(RawChunk {
                content: unit.content.clone(),
                start_char: unit.position,
                end_char: span_end,
                overlap_len: 0,
                completeness: 1.0,
                importance: unit.importance,
                has_table: true,
                truncated: false,
                table_split: false,
            });
        }
        return Ok(());
    }

    let mut consumed = 0usize;
    for (part, mid_sentence) in split_oversized_unit(&unit.content, budget) {
        if cancel.is_cancelled() {
            return Err(ChunkError::Cancelled);
        }
        let start = (unit.position + consumed).min(span_end);
        consumed += part.len() + 1;
        let end = (unit.position + consumed).saturating_sub(1).min(span_end);
        // A part still over budget had no clause/word boundary to use:
        // the unsplittable case, flagged rather than silently violated.
        let truncated = mid_sentence || part.len() > budget;
        out.push(RawChunk {
            content: part,
            start_char: start,
            end_char: end,
            overlap_len: 0,
            completeness: if truncated { 0.3 } else { 0.8 },
            importance: unit.importance,
            has_table: false,
            truncated,
            table_split: false,
        });
    }
    Ok(())
}
