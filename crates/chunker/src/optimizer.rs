//! Chunk optimizer: three ordered post-processing passes over raw chunks.
//!
//! 1. Hard size enforcement — force-split anything over the effective
//!    ceiling (tables by row, prose at sentence then word boundaries).
//! 2. Small-chunk merge — fold short chunks into a neighbor when the
//!    result stays bounded and ends on a complete sentence.
//! 3. Overlap deduplication (opt-in) — collapse near-duplicate adjacent
//!    chunks down to their unique lines.

use std::collections::HashSet;

use tracing::debug;

use morsel_core::ChunkingOptions;

use crate::assembler::{split_oversized_unit, split_table_rows, RawChunk};
use crate::language::LanguageProfile;
use crate::text::word_set_similarity;
use crate::units::is_table_line;

/// Chunks below this many chars are dropped entirely by the dedup pass.
const DEDUP_RESIDUE_MIN: usize = 100;
/// Word-set similarity past which adjacent chunks count as duplicates.
const DEDUP_SIMILARITY: f64 = 0.5;

pub fn optimize(
    chunks: Vec<RawChunk>,
    options: &ChunkingOptions,
    has_tables: bool,
    profile: &dyn LanguageProfile,
) -> Vec<RawChunk> {
    let effective_max = options.effective_max_size(has_tables);
    let chunks = enforce_max_size(chunks, effective_max, options);
    let chunks = merge_small_chunks(chunks, options, profile);
    if options.deduplicate_overlaps {
        deduplicate_overlaps(chunks)
    } else {
        chunks
    }
}

// ── Pass 1: hard enforcement ────────────────────────────────────────

fn enforce_max_size(
    chunks: Vec<RawChunk>,
    effective_max: usize,
    options: &ChunkingOptions,
) -> Vec<RawChunk> {
    let mut out = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        if chunk.content.len() <= effective_max {
            out.push(chunk);
            continue;
        }
        debug!(
            len = chunk.content.len(),
            effective_max, "force-splitting oversize chunk"
        );
        // The duplicated overlap prefix is dropped before splitting so the
        // source text is not multiplied across parts.
        let body = chunk.content[chunk.overlap_len.min(chunk.content.len())..].trim_start();
        if chunk.has_table {
            split_table_chunk(&mut out, &chunk, body, options.max_chunk_size);
        } else {
            for (part, mid_sentence) in split_oversized_unit(body, effective_max) {
                let truncated = mid_sentence || chunk.truncated || part.len() > effective_max;
                out.push(RawChunk {
                    content: part,
                    start_char: chunk.start_char,
                    end_char: chunk.end_char,
                    overlap_len: 0,
                    completeness: chunk.completeness,
                    importance: chunk.importance,
                    has_table: false,
                    truncated,
                    table_split: false,
                });
            }
        }
    }
    out
}

/// Split a chunk that carries table rows: any prose before the table goes
/// sentence-wise, the table itself row-wise with header+separator
/// repeated.
fn split_table_chunk(out: &mut Vec<RawChunk>, chunk: &RawChunk, body: &str, budget: usize) {
    let lines: Vec<&str> = body.lines().collect();
    let table_start = lines
        .iter()
        .position(|l| is_table_line(l) && !l.trim().is_empty())
        .unwrap_or(lines.len());

    let prose = lines[..table_start].join("\n");
    if !prose.trim().is_empty() {
        for (part, truncated) in split_oversized_unit(&prose, budget) {
            out.push(RawChunk {
                content: part,
                start_char: chunk.start_char,
                end_char: chunk.end_char,
                overlap_len: 0,
                completeness: chunk.completeness,
                importance: chunk.importance,
                has_table: false,
                truncated,
                table_split: false,
            });
        }
    }

    let table = lines[table_start..].join("\n");
    if !table.trim().is_empty() {
        for part in split_table_rows(&table, budget) {
            out.push(RawChunk {
                content: part,
                start_char: chunk.start_char,
                end_char: chunk.end_char,
                overlap_len: 0,
                completeness: 1.0,
                importance: chunk.importance,
                has_table: true,
                truncated: false,
                table_split: true,
            });
        }
    }
}

// ── Pass 2: small-chunk merge ───────────────────────────────────────

fn merge_small_chunks(
    chunks: Vec<RawChunk>,
    options: &ChunkingOptions,
    profile: &dyn LanguageProfile,
) -> Vec<RawChunk> {
    let threshold = options.min_chunk_size.max(100);
    // Merged chunks may reach 1.5× the configured maximum.
    let limit = options.max_chunk_size + options.max_chunk_size / 2;

    let mut out: Vec<RawChunk> = Vec::new();
    let mut i = 0;
    while i < chunks.len() {
        let cur = &chunks[i];
        if cur.content.len() >= threshold || cur.table_split {
            out.push(cur.clone());
            i += 1;
            continue;
        }

        // Try the successor first.
        if i + 1 < chunks.len() {
            let next = &chunks[i + 1];
            let next_body = next.content[next.overlap_len.min(next.content.len())..].trim_start();
            let combined = format!("{}\n{}", cur.content, next_body);
            if combined.len() <= limit && profile.ends_with_complete_sentence(&combined) {
                out.push(RawChunk {
                    content: combined,
                    start_char: cur.start_char,
                    end_char: next.end_char,
                    overlap_len: cur.overlap_len,
                    completeness: cur.completeness.max(next.completeness),
                    importance: (cur.importance + next.importance) / 2.0,
                    has_table: cur.has_table || next.has_table,
                    truncated: cur.truncated || next.truncated,
                    table_split: false,
                });
                i += 2;
                continue;
            }
        }

        // Then the predecessor.
        if let Some(prev) = out.last_mut() {
            let cur_body = cur.content[cur.overlap_len.min(cur.content.len())..].trim_start();
            let combined = format!("{}\n{}", prev.content, cur_body);
            if combined.len() <= limit && profile.ends_with_complete_sentence(&combined) {
                prev.content = combined;
                prev.end_char = cur.end_char;
                prev.importance = (prev.importance + cur.importance) / 2.0;
                prev.has_table |= cur.has_table;
                prev.truncated |= cur.truncated;
                i += 1;
                continue;
            }
        }

        // Left standalone: a merge would end mid-sentence or overflow.
        out.push(cur.clone());
        i += 1;
    }
    out
}

// ── Pass 3: overlap deduplication ───────────────────────────────────

fn deduplicate_overlaps(chunks: Vec<RawChunk>) -> Vec<RawChunk> {
    let mut out: Vec<RawChunk> = Vec::new();
    for chunk in chunks {
        let Some(prev) = out.last() else {
            out.push(chunk);
            continue;
        };
        if word_set_similarity(&prev.content, &chunk.content) <= DEDUP_SIMILARITY {
            out.push(chunk);
            continue;
        }

        let residue = {
            let prev_lines: HashSet<&str> = prev.content.lines().map(str::trim).collect();
            chunk
                .content
                .lines()
                .filter(|l| !prev_lines.contains(l.trim()))
                .collect::<Vec<&str>>()
                .join("\n")
        };
        if residue.trim().len() < DEDUP_RESIDUE_MIN {
            debug!(len = chunk.content.len(), "dropping near-duplicate chunk");
            continue;
        }
        out.push(RawChunk {
            content: residue,
            overlap_len: 0,
            ..chunk
        });
    }
    out
}
