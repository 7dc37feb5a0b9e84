//! Adaptive overlap manager: sizes and extracts the trailing-context
//! fragment carried from one chunk into the next.
//!
//! Contract: the extracted text is always a verbatim suffix of the
//! previous chunk; the size stays within `overlap_size` plus at most 50%
//! overshoot (to reach a sentence start instead of cutting mid-sentence);
//! the fragment is never re-inserted when the next chunk already starts
//! with it.

use morsel_core::ChunkingOptions;

use crate::text::is_terminal;

/// Stateless sizing/extraction service, shared read-only.
#[derive(Debug, Default)]
pub struct OverlapManager;

impl OverlapManager {
    pub fn new() -> Self {
        Self
    }

    /// Byte size of the context fragment to copy from `prev` into the
    /// chunk that will start with `next`. Returns 0 when overlap is
    /// disabled, `prev` is empty, or `next` already begins with the
    /// fragment.
    pub fn calculate_optimal_overlap(
        &self,
        prev: &str,
        next: &str,
        options: &ChunkingOptions,
    ) -> usize {
        if options.overlap_size == 0 || prev.is_empty() {
            return 0;
        }
        let target = options.overlap_size.min(prev.len());
        if target == prev.len() {
            // The whole previous chunk fits the overlap budget.
            return if next.starts_with(prev) { 0 } else { target };
        }

        // Allow up to 50% overshoot to land on a sentence start.
        let max_size = target + target / 2;
        let want_start = prev.len() - target;
        let lo = prev.len().saturating_sub(max_size.min(prev.len()));

        // Nearest sentence start to the target size within the window.
        let bytes = prev.as_bytes();
        let mut best: Option<usize> = None;
        for p in lo.max(2)..prev.len() {
            if bytes[p - 1] == b' ' && is_terminal(bytes[p - 2] as char) {
                let closer = match best {
                    Some(b) => p.abs_diff(want_start) < b.abs_diff(want_start),
                    None => true,
                };
                if closer {
                    best = Some(p);
                }
            }
        }
        let mut size = best.map(|p| prev.len() - p).unwrap_or(0);

        if size == 0 {
            // No sentence start in the tolerance zone: shrink forward to
            // the next word boundary instead of starting mid-word.
            let mut q = want_start;
            while q < prev.len() && !bytes[q].is_ascii_whitespace() {
                q += 1;
            }
            while q < prev.len() && bytes[q].is_ascii_whitespace() {
                q += 1;
            }
            if q >= prev.len() {
                return 0;
            }
            size = prev.len() - q;
        }

        let overlap = self.create_context_preserving_overlap(prev, size);
        if overlap.is_empty() || next.starts_with(overlap) {
            return 0;
        }
        overlap.len()
    }

    /// The last `size` bytes of `prev`, snapped forward to a char
    /// boundary. Always a verbatim suffix.
    pub fn create_context_preserving_overlap<'a>(&self, prev: &'a str, size: usize) -> &'a str {
        if size == 0 || prev.is_empty() {
            return "";
        }
        let mut start = prev.len().saturating_sub(size);
        while start < prev.len() && !prev.is_char_boundary(start) {
            start += 1;
        }
        &prev[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(overlap: usize) -> ChunkingOptions {
        ChunkingOptions {
            overlap_size: overlap,
            ..ChunkingOptions::default()
        }
    }

    #[test]
    fn zero_overlap_option_disables_overlap() {
        let m = OverlapManager::new();
        assert_eq!(m.calculate_optimal_overlap("Some text.", "Next.", &opts(0)), 0);
    }

    #[test]
    fn overlap_is_a_verbatim_suffix() {
        let m = OverlapManager::new();
        let prev = "The first point was made. The second point follows here.";
        let size = m.calculate_optimal_overlap(prev, "Next chunk body.", &opts(30));
        assert!(size > 0);
        let overlap = m.create_context_preserving_overlap(prev, size);
        assert!(prev.ends_with(overlap));
    }

    #[test]
    fn overlap_snaps_to_sentence_start_within_tolerance() {
        let m = OverlapManager::new();
        let prev = "Lead-in remark. The closing sentence carries the context.";
        // Target 45 lands mid-sentence; the snap should reach the start
        // of "The closing sentence…".
        let size = m.calculate_optimal_overlap(prev, "Next.", &opts(45));
        let overlap = m.create_context_preserving_overlap(prev, size);
        assert!(overlap.starts_with("The closing"), "got {overlap:?}");
        assert!(size <= 45 + 45 / 2);
    }

    #[test]
    fn overlap_never_exceeds_tolerance() {
        let m = OverlapManager::new();
        let prev = "word ".repeat(100);
        let size = m.calculate_optimal_overlap(&prev, "Next.", &opts(50));
        assert!(size <= 75, "got {size}");
    }

    #[test]
    fn overlap_skipped_when_next_already_starts_with_it() {
        let m = OverlapManager::new();
        let prev = "Intro text here. Tail context sentence.";
        let size = m.calculate_optimal_overlap(prev, "Tail context sentence.", &opts(25));
        assert_eq!(size, 0);
    }

    #[test]
    fn short_previous_chunk_is_used_whole() {
        let m = OverlapManager::new();
        let size = m.calculate_optimal_overlap("Tiny.", "Next body.", &opts(50));
        assert_eq!(size, 5);
    }

    #[test]
    fn mid_word_start_shrinks_to_word_boundary() {
        let m = OverlapManager::new();
        let prev = "nowhitespaceanywhereinthetail plus a few trailing words";
        let size = m.calculate_optimal_overlap(prev, "Next.", &opts(20));
        let overlap = m.create_context_preserving_overlap(prev, size);
        assert!(!overlap.starts_with(char::is_whitespace));
        assert!(prev.ends_with(overlap));
        // Starts at a word boundary, not inside "trailing".
        let start = prev.len() - overlap.len();
        assert!(start == 0 || prev.as_bytes()[start - 1] == b' ');
    }
}
