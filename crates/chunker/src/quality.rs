//! Quality scorer: four independent 0–1 metrics computed from chunk text
//! alone, plus the weighted overall score.
//!
//! The deltas are explicit piecewise adjustments; they are part of the
//! observable contract, not tuning knobs.

use std::collections::HashSet;

use crate::text::split_sentences;

/// Per-chunk quality breakdown.
#[derive(Debug, Clone, Copy)]
pub struct QualityScores {
    pub completeness: f64,
    pub independence: f64,
    pub density: f64,
    pub sharpness: f64,
    pub overall: f64,
}

/// Weights of the overall score.
const W_COMPLETENESS: f64 = 0.30;
const W_INDEPENDENCE: f64 = 0.30;
const W_DENSITY: f64 = 0.20;
const W_SHARPNESS: f64 = 0.20;

const PRONOUNS: &[&str] = &[
    "it", "they", "he", "she", "this", "that", "these", "those", "them",
    "its", "their", "his", "her",
];

const CONJUNCTIONS: &[&str] = &["and", "but", "or", "because", "however", "so", "yet"];

const BACKWARD_REFERENCES: &[&str] = &[
    "as mentioned above",
    "as described above",
    "as noted above",
    "the aforementioned",
    "see above",
    "as stated earlier",
];

/// Stateless scorer; safe to share.
#[derive(Debug, Default)]
pub struct QualityScorer;

impl QualityScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, content: &str) -> QualityScores {
        let completeness = completeness(content);
        let independence = independence(content);
        let density = density(content);
        let sharpness = sharpness(content);
        let overall = W_COMPLETENESS * completeness
            + W_INDEPENDENCE * independence
            + W_DENSITY * density
            + W_SHARPNESS * sharpness;
        QualityScores {
            completeness,
            independence,
            density,
            sharpness,
            overall,
        }
    }
}

fn clamp(score: f64) -> f64 {
    score.clamp(0.0, 1.0)
}

fn first_word(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or("")
}

fn ends_with_terminal(text: &str) -> bool {
    matches!(text.chars().last(), Some('.') | Some('!') | Some('?'))
}

// ── Completeness ────────────────────────────────────────────────────

fn completeness(content: &str) -> f64 {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    let mut score: f64 = 1.0;

    if !ends_with_terminal(trimmed) {
        score -= 0.2;
    }

    // Improper start: punctuation or a lowercase word other than a
    // conjunction (conjunctions carry their own penalty).
    let first_char = trimmed.chars().next().unwrap_or(' ');
    let lead = first_word(trimmed).to_lowercase();
    let conjunction_start = CONJUNCTIONS.contains(&lead.as_str())
        && first_char.is_lowercase();
    if conjunction_start {
        score -= 0.2;
    } else if first_char.is_lowercase() || matches!(first_char, ',' | ';' | ')' | ']') {
        score -= 0.15;
    }

    if trimmed.ends_with("...") || trimmed.ends_with('…') || trimmed.ends_with('-') || trimmed.ends_with('–') {
        score -= 0.25;
    }

    if has_unbalanced_brackets(trimmed) {
        score -= 0.15;
    }

    if trimmed.len() >= 50 {
        score += 0.05;
    }

    clamp(score)
}

fn has_unbalanced_brackets(text: &str) -> bool {
    let pairs = [('(', ')'), ('[', ']'), ('{', '}')];
    pairs.iter().any(|&(open, close)| {
        text.chars().filter(|&c| c == open).count() != text.chars().filter(|&c| c == close).count()
    })
}

// ── Context independence ────────────────────────────────────────────

fn independence(content: &str) -> f64 {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    let mut score: f64 = 1.0;

    // Dangling leading pronoun: the chunk opens by pointing backwards.
    let lead = first_word(trimmed).to_lowercase();
    if PRONOUNS.contains(&lead.as_str()) {
        score -= 0.25;
    }

    let words: Vec<String> = trimmed
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .collect();
    if !words.is_empty() {
        let pronoun_count = words.iter().filter(|w| PRONOUNS.contains(&w.as_str())).count();
        let ratio = pronoun_count as f64 / words.len() as f64;
        if ratio > 0.15 {
            score -= 0.2;
        } else if ratio > 0.10 {
            score -= 0.1;
        }
    }

    let lower = trimmed.to_lowercase();
    if BACKWARD_REFERENCES.iter().any(|p| lower.contains(p)) {
        score -= 0.15;
    }

    if is_self_contained_list(trimmed) {
        score += 0.1;
    }

    if has_clear_topic_sentence(trimmed) {
        score += 0.05;
    }

    clamp(score)
}

/// An intro line ending in a colon followed by at least two list items.
fn is_self_contained_list(text: &str) -> bool {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() < 3 {
        return false;
    }
    let intro = lines[0].trim_end();
    let items = lines[1..]
        .iter()
        .filter(|l| {
            let t = l.trim_start();
            t.starts_with("- ") || t.starts_with("* ") || t.starts_with(|c: char| c.is_ascii_digit())
        })
        .count();
    intro.ends_with(':') && items >= 2
}

/// First sentence is a proper standalone statement of reasonable length.
fn has_clear_topic_sentence(text: &str) -> bool {
    let sentences = split_sentences(text);
    let Some(first) = sentences.first() else {
        return false;
    };
    first.len() > 20
        && first.chars().next().is_some_and(|c| c.is_uppercase())
        && ends_with_terminal(first)
}

// ── Information density ─────────────────────────────────────────────

fn density(content: &str) -> f64 {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    let mut score: f64 = 0.5;

    let non_ws = trimmed.chars().filter(|c| !c.is_whitespace()).count();
    let ratio = non_ws as f64 / trimmed.chars().count() as f64;
    if ratio > 0.85 {
        score += 0.1;
    } else if ratio < 0.7 {
        score -= 0.1;
    }

    let words: Vec<&str> = trimmed.split_whitespace().collect();
    if !words.is_empty() {
        let avg_len =
            words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / words.len() as f64;
        if avg_len > 6.0 {
            score += 0.1;
        } else if avg_len < 3.0 {
            score -= 0.1;
        }

        let unique: HashSet<String> = words.iter().map(|w| w.to_lowercase()).collect();
        let uniqueness = unique.len() as f64 / words.len() as f64;
        if uniqueness > 0.7 {
            score += 0.15;
        } else if uniqueness < 0.4 {
            score -= 0.1;
        }
    }

    if trimmed.chars().any(|c| c.is_ascii_digit()) {
        score += 0.05;
    }
    // Proper nouns: capitalized words not at a sentence start.
    if words
        .iter()
        .skip(1)
        .any(|w| w.chars().next().is_some_and(|c| c.is_uppercase()))
    {
        score += 0.05;
    }
    if trimmed.contains("```") || trimmed.contains("::") || trimmed.contains("=>") {
        score += 0.05;
    }

    if trimmed.len() < 100 {
        score -= 0.15;
    }

    clamp(score)
}

// ── Boundary sharpness ──────────────────────────────────────────────

fn sharpness(content: &str) -> f64 {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    let mut score: f64 = 0.8;

    let starts_structural = trimmed.starts_with('#') || trimmed.starts_with("```");
    let first_char = trimmed.chars().next().unwrap_or(' ');
    if starts_structural {
        score += 0.1;
    } else if first_char.is_lowercase() {
        score -= 0.2;
    }

    if trimmed.ends_with("```") {
        score += 0.1;
    } else if !ends_with_terminal(trimmed) {
        score -= 0.2;
    }

    if split_sentences(trimmed).len() >= 3 {
        score += 0.05;
    }

    clamp(score)
}
