//! Boundary quality evaluator: scores a candidate split offset via four
//! local heuristics and searches nearby offsets for a better one.
//!
//! The distance buckets are part of the observable contract; keep them as
//! explicit piecewise functions.

use std::sync::Arc;

use tracing::debug;

use morsel_core::ChunkingOptions;

use crate::language::LanguageProfile;
use crate::structure::{heading_level, is_list_item};
use crate::text::{floor_char_boundary, is_terminal, jaccard, keywords};
use crate::units::is_table_line;

/// Which heuristic produced the winning score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    Sentence,
    Paragraph,
    Structural,
    Semantic,
}

/// Result of evaluating one candidate split offset.
#[derive(Debug, Clone)]
pub struct BoundaryQuality {
    /// Quality in [0, 1]; higher is a more natural split point.
    pub score: f64,
    pub kind: BoundaryKind,
    pub reason: String,
}

/// Half-width of the sentence/paragraph search windows.
const SENTENCE_WINDOW: usize = 100;
const PARAGRAPH_WINDOW: usize = 150;
const STRUCTURAL_WINDOW: usize = 200;
/// Chars sampled on each side for the keyword continuity check.
const SEMANTIC_WINDOW: usize = 200;

/// Sampling stride of the improvement search.
const SEARCH_STRIDE: usize = 10;
/// Score at which the improvement search stops early.
const EARLY_EXIT_SCORE: f64 = 0.95;

/// Stateless scoring service. Holds only the immutable language profile;
/// safe to share across threads.
pub struct BoundaryEvaluator {
    profile: Arc<dyn LanguageProfile>,
}

impl BoundaryEvaluator {
    pub fn new(profile: Arc<dyn LanguageProfile>) -> Self {
        Self { profile }
    }

    /// Score the split candidate at byte offset `pos`. Out-of-range
    /// offsets are clamped; the result is the max of four heuristics.
    pub fn evaluate(&self, text: &str, pos: usize) -> BoundaryQuality {
        let pos = floor_char_boundary(text, pos.min(text.len()));

        let candidates = [
            (
                sentence_proximity(text, pos),
                BoundaryKind::Sentence,
                "sentence terminator nearby",
            ),
            (
                paragraph_proximity(text, pos),
                BoundaryKind::Paragraph,
                "paragraph break nearby",
            ),
            (
                structural_proximity(text, pos),
                BoundaryKind::Structural,
                "structural boundary nearby",
            ),
            (
                self.semantic_discontinuity(text, pos),
                BoundaryKind::Semantic,
                "keyword continuity drops here",
            ),
        ];

        let (score, kind, reason) = candidates
            .iter()
            .cloned()
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .unwrap_or((0.0, BoundaryKind::Semantic, "no signal"));

        BoundaryQuality {
            score,
            kind,
            reason: reason.to_string(),
        }
    }

    /// Search near `pos` for a better split offset. Bounded local
    /// hill-climb: stride-10 sweep inside the radius, early exit at
    /// `EARLY_EXIT_SCORE`, then a ±5 refinement of the top three
    /// candidates. Returns the best offset found (possibly `pos` itself).
    pub fn improve(&self, text: &str, pos: usize, options: &ChunkingOptions) -> usize {
        let pos = floor_char_boundary(text, pos.min(text.len()));
        let radius = (options.max_chunk_size / 10).min(200);
        if radius == 0 || text.is_empty() {
            return pos;
        }

        let lo = pos.saturating_sub(radius);
        let hi = (pos + radius).min(text.len());

        let mut scored: Vec<(usize, f64)> = vec![(pos, self.evaluate(text, pos).score)];

        let mut candidate = lo;
        while candidate <= hi {
            let snapped = floor_char_boundary(text, candidate);
            if snapped != pos {
                let score = self.evaluate(text, snapped).score;
                if score >= EARLY_EXIT_SCORE {
                    debug!(pos, improved = snapped, score, "early exit on strong boundary");
                    return snapped;
                }
                scored.push((snapped, score));
            }
            candidate += SEARCH_STRIDE;
        }

        // Refine the three strongest candidates char by char.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        let mut best = scored[0];
        for &(center, _) in scored.iter().take(3) {
            let micro_lo = center.saturating_sub(5);
            let micro_hi = (center + 5).min(text.len());
            for p in micro_lo..=micro_hi {
                if !text.is_char_boundary(p) {
                    continue;
                }
                let score = self.evaluate(text, p).score;
                if score > best.1 {
                    best = (p, score);
                }
            }
        }
        best.0
    }

    /// Inverted Jaccard continuity of stop-word-filtered keywords around
    /// `pos`: a low overlap between the two sides means the topic shifts,
    /// which makes a good split.
    fn semantic_discontinuity(&self, text: &str, pos: usize) -> f64 {
        let before_start = floor_char_boundary(text, pos.saturating_sub(SEMANTIC_WINDOW));
        let after_end = floor_char_boundary(text, (pos + SEMANTIC_WINDOW).min(text.len()));
        let before = &text[before_start..pos];
        let after = &text[pos..after_end];
        if before.trim().is_empty() || after.trim().is_empty() {
            return 0.5;
        }
        let stop = self.profile.stop_words();
        let kw_before = keywords(before, stop, 3);
        let kw_after = keywords(after, stop, 3);
        if kw_before.is_empty() || kw_after.is_empty() {
            return 0.5;
        }
        // Damped so a vocabulary shift alone never outranks an exact
        // sentence or paragraph boundary.
        (1.0 - jaccard(&kw_before, &kw_after)) * 0.8
    }
}

/// Distance from `pos` to the nearest split point just after a sentence
/// terminator, bucketed.
fn sentence_proximity(text: &str, pos: usize) -> f64 {
    let dist = nearest_match(text, pos, SENTENCE_WINDOW, |bytes, i| {
        i > 0 && is_terminal(bytes[i - 1] as char) && bytes[i - 1].is_ascii()
    });
    match dist {
        Some(0) => 1.0,
        Some(d) if d < 5 => 0.9,
        Some(d) if d < 10 => 0.7,
        Some(d) if d < 20 => 0.5,
        _ => 0.3,
    }
}

/// Distance from `pos` to the nearest blank-line run, bucketed.
fn paragraph_proximity(text: &str, pos: usize) -> f64 {
    let bytes = text.as_bytes();
    let dist = nearest_match(text, pos, PARAGRAPH_WINDOW, |_, i| {
        i + 1 < bytes.len() && bytes[i] == b'\n' && bytes[i + 1] == b'\n'
    });
    match dist {
        Some(0) => 1.0,
        Some(d) if d < 5 => 0.8,
        Some(d) if d < 10 => 0.6,
        Some(d) if d < 20 => 0.4,
        _ => 0.2,
    }
}

/// Distance to the nearest header/list/table line start; exact table
/// boundaries dominate at 0.95.
fn structural_proximity(text: &str, pos: usize) -> f64 {
    let mut best: f64 = 0.0;
    let window_lo = pos.saturating_sub(STRUCTURAL_WINDOW);

    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let line_end = offset + line.len();
        if line_end >= window_lo && offset <= pos + STRUCTURAL_WINDOW {
            let content = line.trim_end_matches('\n');
            let dist = pos.abs_diff(offset);
            let score = if is_table_line(content) && !content.trim().is_empty() {
                table_boundary_score(dist)
            } else if heading_level(content).is_some() {
                header_boundary_score(dist)
            } else if is_list_item(content) {
                list_boundary_score(dist)
            } else {
                0.0
            };
            best = best.max(score);
        }
        if offset > pos + STRUCTURAL_WINDOW {
            break;
        }
        offset = line_end;
    }
    best
}

fn table_boundary_score(dist: usize) -> f64 {
    match dist {
        0 => 0.95,
        d if d < 10 => 0.7,
        d if d < 30 => 0.5,
        _ => 0.0,
    }
}

fn header_boundary_score(dist: usize) -> f64 {
    match dist {
        0 => 0.9,
        d if d < 10 => 0.75,
        d if d < 30 => 0.6,
        _ => 0.0,
    }
}

fn list_boundary_score(dist: usize) -> f64 {
    match dist {
        0 => 0.8,
        d if d < 10 => 0.65,
        d if d < 30 => 0.5,
        _ => 0.0,
    }
}

/// Smallest distance within `window` of `pos` at which `pred` matches,
/// scanning both directions.
fn nearest_match(
    text: &str,
    pos: usize,
    window: usize,
    pred: impl Fn(&[u8], usize) -> bool,
) -> Option<usize> {
    let bytes = text.as_bytes();
    let lo = pos.saturating_sub(window);
    let hi = (pos + window).min(bytes.len());
    let mut best: Option<usize> = None;
    for i in lo..=hi {
        if i <= bytes.len() && pred(bytes, i) {
            let d = pos.abs_diff(i);
            best = Some(best.map_or(d, |b: usize| b.min(d)));
        }
    }
    best
}
