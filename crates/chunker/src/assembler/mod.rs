//! Chunk assemblers: greedy accumulator state machines folding semantic
//! units into bounded chunks, consulting the boundary evaluator and the
//! overlap manager.
//!
//! Two strategy variants share the accumulator and the oversize-unit
//! fallbacks: [`smart`] gates flushes on a completeness heuristic,
//! [`intelligent`] adds table atomicity and header-forced flushes.

mod intelligent;
mod smart;

pub use intelligent::assemble_intelligent;
pub use smart::assemble_smart;


use std::collections::HashSet;

use morsel_core::{CancelFlag, ChunkError, ChunkingOptions, ChunkingStrategy};

use crate::boundary::BoundaryEvaluator;
use crate::language::LanguageProfile;
use crate::overlap::OverlapManager;
use crate::text::{is_clause_break, split_sentences};
use crate::units::SemanticUnit;

/// Transient chunk between assembly and optimization.
#[derive(Debug, Clone)]
pub struct RawChunk {
    pub content: String,
    pub start_char: usize,
    pub end_char: usize,
    /// Bytes at the head of `content` copied verbatim from the previous
    /// chunk's tail.
    pub overlap_len: usize,
    /// Assembler-local completeness heuristic at flush time.
    pub completeness: f64,
    /// Mean importance of the folded units.
    pub importance: f64,
    pub has_table: bool,
    /// An atomic unit that could not be split below the ceiling, or a
    /// non-final fragment of a force-split sentence.
    pub truncated: bool,
    /// Part of a row-split table (header+separator repeated).
    pub table_split: bool,
}

/// Dispatch on the configured strategy.
#[allow(clippy::too_many_arguments)]
pub fn assemble(
    units: &[SemanticUnit],
    text: &str,
    options: &ChunkingOptions,
    profile: &dyn LanguageProfile,
    evaluator: &BoundaryEvaluator,
    overlap: &OverlapManager,
    cancel: &CancelFlag,
) -> Result<Vec<RawChunk>, ChunkError> {
    match options.strategy {
        ChunkingStrategy::Smart => assemble_smart(units, options, profile, overlap, cancel),
        ChunkingStrategy::Intelligent => {
            assemble_intelligent(units, text, options, profile, evaluator, overlap, cancel)
        }
    }
}

// ── Accumulator ─────────────────────────────────────────────────────

/// Running chunk under construction.
#[derive(Debug, Default)]
pub(super) struct Accumulator {
    content: String,
    start_char: usize,
    end_char: usize,
    overlap_len: usize,
    importance_sum: f64,
    unit_count: usize,
    has_table: bool,
}

impl Accumulator {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn is_empty(&self) -> bool {
        self.unit_count == 0
    }

    pub(super) fn len(&self) -> usize {
        self.content.len()
    }

    /// Size after folding `unit` in, separator included.
    pub(super) fn projected_len(&self, unit: &SemanticUnit) -> usize {
        if self.content.is_empty() {
            unit.content.len()
        } else {
            self.content.len() + 1 + unit.content.len()
        }
    }

    /// Prepend the overlap fragment carried from the previous chunk.
    /// Only valid on a fresh accumulator.
    pub(super) fn seed_overlap(&mut self, fragment: &str) {
        debug_assert!(self.is_empty() && self.content.is_empty());
        self.content.push_str(fragment);
        self.overlap_len = fragment.len();
    }

    pub(super) fn push(&mut self, unit: &SemanticUnit) {
        if self.unit_count == 0 {
            self.start_char = unit.position;
            if !self.content.is_empty() {
                self.content.push('\n');
            }
        } else {
            self.content.push('\n');
        }
        self.content.push_str(&unit.content);
        self.end_char = unit.position + unit.content.len();
        self.importance_sum += unit.importance;
        self.unit_count += 1;
        self.has_table |= unit.is_table();
    }

    /// Drain into a [`RawChunk`], leaving the accumulator fresh.
    pub(super) fn take_chunk(&mut self, completeness: f64) -> RawChunk {
        let importance = if self.unit_count > 0 {
            self.importance_sum / self.unit_count as f64
        } else {
            0.0
        };
        let chunk = RawChunk {
            content: std::mem::take(&mut self.content),
            start_char: self.start_char,
            end_char: self.end_char,
            overlap_len: self.overlap_len,
            completeness,
            importance,
            has_table: self.has_table,
            truncated: false,
            table_split: false,
        };
        *self = Self::new();
        chunk
    }
}

/// Flush the accumulator into `out`, checking cancellation once per
/// emitted chunk. A unit-less accumulator (overlap seed only) is reset
/// without emitting.
pub(super) fn flush(
    out: &mut Vec<RawChunk>,
    acc: &mut Accumulator,
    completeness: f64,
    cancel: &CancelFlag,
) -> Result<(), ChunkError> {
    if cancel.is_cancelled() {
        return Err(ChunkError::Cancelled);
    }
    if acc.is_empty() {
        *acc = Accumulator::new();
        return Ok(());
    }
    out.push(acc.take_chunk(completeness));
    Ok(())
}

/// Seed the next accumulator with overlap from the chunk just emitted.
pub(super) fn seed_from_previous(
    acc: &mut Accumulator,
    out: &[RawChunk],
    next_unit: &SemanticUnit,
    overlap: &OverlapManager,
    options: &ChunkingOptions,
) {
    let Some(prev) = out.last() else {
        return;
    };
    let size = overlap.calculate_optimal_overlap(&prev.content, &next_unit.content, options);
    if size > 0 {
        let fragment = overlap.create_context_preserving_overlap(&prev.content, size);
        acc.seed_overlap(fragment);
    }
}

// ── Completeness heuristic ──────────────────────────────────────────

/// Assembler-local completeness: weighted mix of complete-sentence
/// fraction, paragraph alignment with the next unit, lexical coherence,
/// and length adequacy. Gates flushing; intentionally independent of the
/// final quality scorer.
pub(super) fn completeness_of(
    content: &str,
    next: Option<&SemanticUnit>,
    options: &ChunkingOptions,
    profile: &dyn LanguageProfile,
) -> f64 {
    if content.trim().is_empty() {
        return 0.0;
    }

    let sentences = split_sentences(content);
    let sentence_score = if sentences.is_empty() {
        0.0
    } else {
        let complete = sentences
            .iter()
            .filter(|s| profile.ends_with_complete_sentence(s))
            .count();
        complete as f64 / sentences.len() as f64
    };

    let alignment = match next {
        None => 1.0,
        Some(u) if u.is_section_header => 1.0,
        Some(u)
            if u.content
                .trim_start()
                .starts_with(|c: char| c.is_uppercase()) =>
        {
            0.8
        }
        Some(_) => 0.4,
    };

    let words: Vec<String> = content
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect();
    let coherence = if words.is_empty() {
        0.0
    } else {
        let unique: HashSet<&String> = words.iter().collect();
        1.0 - (unique.len() as f64 / words.len() as f64) * 0.5
    };

    let adequacy = (content.len() as f64 / options.min_chunk_size.max(1) as f64).min(1.0);

    0.4 * sentence_score + 0.2 * alignment + 0.2 * coherence + 0.2 * adequacy
}

// ── Oversize fallbacks ──────────────────────────────────────────────

/// Split an oversize text unit: whole sentences are packed first; a
/// single sentence over the budget falls back clause → word. The bool
/// marks non-final fragments of a broken sentence.
pub(crate) fn split_oversized_unit(content: &str, budget: usize) -> Vec<(String, bool)> {
    let mut parts: Vec<(String, bool)> = Vec::new();
    let mut buf = String::new();

    for sentence in split_sentences(content) {
        if sentence.len() > budget {
            if !buf.is_empty() {
                parts.push((std::mem::take(&mut buf), false));
            }
            let pieces = split_long_sentence(&sentence, budget);
            let n = pieces.len();
            for (i, piece) in pieces.into_iter().enumerate() {
                parts.push((piece, i + 1 < n));
            }
            continue;
        }
        if buf.is_empty() {
            buf = sentence;
        } else if buf.len() + 1 + sentence.len() <= budget {
            buf.push(' ');
            buf.push_str(&sentence);
        } else {
            parts.push((std::mem::take(&mut buf), false));
            buf = sentence;
        }
    }
    if !buf.is_empty() {
        parts.push((buf, false));
    }
    parts
}

/// Clause punctuation first, then word boundaries. A single word over the
/// budget is returned as its own oversize piece — the unsplittable case.
fn split_long_sentence(sentence: &str, budget: usize) -> Vec<String> {
    let mut parts = Vec::new();
    let mut buf = String::new();

    for clause in split_clauses(sentence) {
        if clause.len() > budget {
            if !buf.is_empty() {
                parts.push(std::mem::take(&mut buf));
            }
            parts.extend(split_words(&clause, budget));
            continue;
        }
        if buf.is_empty() {
            buf = clause;
        } else if buf.len() + 1 + clause.len() <= budget {
            buf.push(' ');
            buf.push_str(&clause);
        } else {
            parts.push(std::mem::take(&mut buf));
            buf = clause;
        }
    }
    if !buf.is_empty() {
        parts.push(buf);
    }
    parts
}

/// Cut after clause punctuation followed by a space.
fn split_clauses(sentence: &str) -> Vec<String> {
    let mut clauses = Vec::new();
    let mut start = 0;
    let bytes = sentence.as_bytes();
    for i in 0..bytes.len() {
        if is_clause_break(bytes[i] as char)
            && bytes[i].is_ascii()
            && i + 1 < bytes.len()
            && bytes[i + 1] == b' '
        {
            let piece = sentence[start..=i].trim();
            if !piece.is_empty() {
                clauses.push(piece.to_string());
            }
            start = i + 2;
        }
    }
    let tail = sentence[start.min(sentence.len())..].trim();
    if !tail.is_empty() {
        clauses.push(tail.to_string());
    }
    clauses
}

fn split_words(text: &str, budget: usize) -> Vec<String> {
    let mut parts = Vec::new();
    let mut buf = String::new();
    for word in text.split_whitespace() {
        if word.len() > budget {
            if !buf.is_empty() {
                parts.push(std::mem::take(&mut buf));
            }
            // Unsplittable token, emitted oversize rather than cut mid-word.
            parts.push(word.to_string());
            continue;
        }
        if buf.is_empty() {
            buf = word.to_string();
        } else if buf.len() + 1 + word.len() <= budget {
            buf.push(' ');
            buf.push_str(word);
        } else {
            parts.push(std::mem::take(&mut buf));
            buf = word.to_string();
        }
    }
    if !buf.is_empty() {
        parts.push(buf);
    }
    parts
}

// ── Table row split ─────────────────────────────────────────────────

/// True for a markdown alignment row like `|---|:--:|`.
pub(crate) fn is_separator_row(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && trimmed.contains('-')
        && trimmed
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':' | ' '))
}

/// Split a folded table by row, repeating header (and separator, when
/// present) at the top of every part. Each part stays within `budget`
/// where possible but always carries at least one data row.
pub(crate) fn split_table_rows(table: &str, budget: usize) -> Vec<String> {
    let lines: Vec<&str> = table.lines().collect();
    if lines.is_empty() {
        return Vec::new();
    }

    let mut prefix = lines[0].to_string();
    let mut data_start = 1;
    if lines.len() > 1 && is_separator_row(lines[1]) {
        prefix.push('\n');
        prefix.push_str(lines[1]);
        data_start = 2;
    }

    let mut parts = Vec::new();
    let mut part = prefix.clone();
    let mut rows_in_part = 0;
    for row in &lines[data_start..] {
        let projected = part.len() + 1 + row.len();
        if rows_in_part > 0 && projected > budget {
            parts.push(std::mem::take(&mut part));
            part = prefix.clone();
            rows_in_part = 0;
        }
        part.push('\n');
        part.push_str(row);
        rows_in_part += 1;
    }
    if rows_in_part > 0 {
        parts.push(part);
    } else if parts.is_empty() {
        // Header-only table.
        parts.push(part);
    }
    parts
}
