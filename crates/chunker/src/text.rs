//! Low-level text scanning utilities shared across the pipeline.

/// Sentence-terminal punctuation.
pub(crate) fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Clause punctuation used as the first fallback when a single sentence
/// exceeds the size ceiling.
pub(crate) fn is_clause_break(c: char) -> bool {
    matches!(c, ',' | ';' | ':')
}

/// Largest byte offset ≤ `pos` that lies on a char boundary.
pub(crate) fn floor_char_boundary(text: &str, pos: usize) -> usize {
    if pos >= text.len() {
        return text.len();
    }
    let mut p = pos;
    while p > 0 && !text.is_char_boundary(p) {
        p -= 1;
    }
    p
}

/// Approximate token count via whitespace splitting.
pub(crate) fn count_tokens(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Split `text` at sentence boundaries (`. `, `! `, `? ` followed by
/// uppercase or newline). Returns non-empty fragments.
pub(crate) fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();

    let mut i = 0;
    while i < bytes.len() {
        let terminal = bytes[i] == b'.' || bytes[i] == b'!' || bytes[i] == b'?';
        if terminal {
            // Look ahead: must be followed by a space then uppercase or newline.
            if i + 1 < bytes.len() && bytes[i + 1] == b' ' {
                let after_space = if i + 2 < bytes.len() {
                    bytes[i + 2]
                } else {
                    b'\n' // end-of-string acts like newline
                };
                if after_space.is_ascii_uppercase() || after_space == b'\n' {
                    let end = i + 1; // include the terminal punctuation
                    let s = text[start..end].trim();
                    if !s.is_empty() {
                        sentences.push(s.to_string());
                    }
                    start = end + 1; // skip the space
                    i = start;
                    continue;
                }
            }
        }
        i += 1;
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

/// Lowercased alphanumeric words of at least `min_len` chars, with
/// `stop_words` removed. The keyword basis for semantic continuity checks.
pub(crate) fn keywords(
    text: &str,
    stop_words: &std::collections::HashSet<&'static str>,
    min_len: usize,
) -> std::collections::HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() >= min_len)
        .map(|w| w.to_lowercase())
        .filter(|w| !stop_words.contains(w.as_str()))
        .collect()
}

/// Jaccard similarity of two string sets. 0.0 when both are empty.
pub(crate) fn jaccard(
    a: &std::collections::HashSet<String>,
    b: &std::collections::HashSet<String>,
) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Word-set similarity of two texts, case-insensitive, no stop-word filter.
pub(crate) fn word_set_similarity(a: &str, b: &str) -> f64 {
    let set_a: std::collections::HashSet<String> = a
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect();
    let set_b: std::collections::HashSet<String> = b
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect();
    jaccard(&set_a, &set_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn sentence_splitting() {
        let sents = split_sentences("First sentence. Second sentence. Third one.");
        assert_eq!(sents.len(), 3);
        assert!(sents[0].starts_with("First"));
        assert!(sents[1].starts_with("Second"));
    }

    #[test]
    fn abbreviation_followed_by_lowercase_does_not_split() {
        let sents = split_sentences("The value of approx. five units held.");
        assert_eq!(sents.len(), 1);
    }

    #[test]
    fn floor_char_boundary_snaps_into_multibyte() {
        let text = "über"; // 'ü' is two bytes
        assert_eq!(floor_char_boundary(text, 1), 0);
        assert_eq!(floor_char_boundary(text, 2), 2);
        assert_eq!(floor_char_boundary(text, 99), text.len());
    }

    #[test]
    fn keywords_filter_stop_words_and_short_tokens() {
        let stops: HashSet<&'static str> = ["the", "and"].into_iter().collect();
        let kw = keywords("The quick fox and the dog ran", &stops, 3);
        assert!(kw.contains("quick"));
        assert!(kw.contains("fox"));
        assert!(!kw.contains("the"));
        assert!(!kw.contains("and"));
        assert!(kw.contains("dog"));
    }

    #[test]
    fn jaccard_of_disjoint_sets_is_zero() {
        let a: HashSet<String> = ["alpha".to_string()].into_iter().collect();
        let b: HashSet<String> = ["beta".to_string()].into_iter().collect();
        assert_eq!(jaccard(&a, &b), 0.0);
        assert_eq!(jaccard(&a, &a), 1.0);
    }

    #[test]
    fn count_tokens_handles_whitespace() {
        assert_eq!(count_tokens("hello world"), 2);
        assert_eq!(count_tokens("  spaced   out  "), 2);
        assert_eq!(count_tokens(""), 0);
    }
}
