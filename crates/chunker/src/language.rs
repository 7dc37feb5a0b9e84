//! Language profiles: sentence and section detection seams.
//!
//! The engine is language-agnostic; everything language-specific flows
//! through this trait. Profiles hold only immutable state and are shared
//! concurrently via `Arc`.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

/// Language-specific predicates consumed by the pipeline.
pub trait LanguageProfile: Send + Sync {
    /// ISO-ish language code, e.g. "en".
    fn code(&self) -> &str;

    /// True if `line` opens a new section in this language's conventions
    /// (beyond markdown `#` headings, which the extractor handles itself).
    fn is_section_marker(&self, line: &str) -> bool;

    /// True if `text` ends on a complete sentence.
    fn ends_with_complete_sentence(&self, text: &str) -> bool;

    /// Stop words removed before keyword continuity checks.
    fn stop_words(&self) -> &HashSet<&'static str>;
}

/// Shared terminal-punctuation check: terminal char, optionally followed by
/// a closing quote/bracket.
fn ends_terminal(text: &str) -> bool {
    let trimmed = text.trim_end();
    let mut chars = trimmed.chars().rev();
    match chars.next() {
        Some(c) if matches!(c, '.' | '!' | '?') => true,
        Some(c) if matches!(c, '"' | '\'' | ')' | ']' | '»' | '“' | '”') => {
            matches!(chars.next(), Some(p) if matches!(p, '.' | '!' | '?'))
        }
        _ => false,
    }
}

/// A line that is entirely uppercase letters/digits/punctuation reads as a
/// section title in most Latin-script documents.
fn is_all_caps_title(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.len() < 4 || trimmed.len() > 80 || trimmed.contains('.') {
        return false;
    }
    let mut has_alpha = false;
    for c in trimmed.chars() {
        if c.is_alphabetic() {
            has_alpha = true;
            if !c.is_uppercase() {
                return false;
            }
        }
    }
    has_alpha
}

fn starts_with_numbered_heading(line: &str, prefixes: &[&str]) -> bool {
    let trimmed = line.trim_start();
    prefixes.iter().any(|p| {
        trimmed
            .strip_prefix(p)
            .map(|rest| rest.trim_start().starts_with(|c: char| c.is_ascii_digit()))
            .unwrap_or(false)
    })
}

// ── English ─────────────────────────────────────────────────────────

const ENGLISH_STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "can", "had",
    "her", "was", "one", "our", "out", "has", "have", "been", "were", "they",
    "this", "that", "with", "from", "will", "would", "there", "their", "what",
    "about", "which", "when", "your", "said", "each", "she", "him", "his",
    "how", "its", "also", "than", "then", "them", "these", "some", "into",
    "more", "other", "such", "only", "over", "most", "very", "after", "where",
];

pub struct EnglishProfile {
    stop_words: HashSet<&'static str>,
}

impl EnglishProfile {
    pub fn new() -> Self {
        Self {
            stop_words: ENGLISH_STOP_WORDS.iter().copied().collect(),
        }
    }
}

impl Default for EnglishProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageProfile for EnglishProfile {
    fn code(&self) -> &str {
        "en"
    }

    fn is_section_marker(&self, line: &str) -> bool {
        starts_with_numbered_heading(line, &["Chapter", "Section", "Part", "Appendix"])
            || is_all_caps_title(line)
    }

    fn ends_with_complete_sentence(&self, text: &str) -> bool {
        ends_terminal(text)
    }

    fn stop_words(&self) -> &HashSet<&'static str> {
        &self.stop_words
    }
}

// ── German ──────────────────────────────────────────────────────────

const GERMAN_STOP_WORDS: &[&str] = &[
    "der", "die", "das", "und", "ist", "von", "mit", "für", "auf", "den",
    "dem", "des", "ein", "eine", "einer", "eines", "nicht", "auch", "sich",
    "als", "aber", "aus", "bei", "nach", "wie", "wird", "werden", "wurde",
    "sind", "war", "hat", "haben", "kann", "können", "über", "unter", "durch",
    "wenn", "dann", "noch", "nur", "oder", "sein", "seine", "ihre", "dieser",
    "diese", "dieses", "einem", "einen", "zum", "zur", "man", "mehr", "sehr",
];

pub struct GermanProfile {
    stop_words: HashSet<&'static str>,
}

impl GermanProfile {
    pub fn new() -> Self {
        Self {
            stop_words: GERMAN_STOP_WORDS.iter().copied().collect(),
        }
    }
}

impl Default for GermanProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageProfile for GermanProfile {
    fn code(&self) -> &str {
        "de"
    }

    fn is_section_marker(&self, line: &str) -> bool {
        starts_with_numbered_heading(line, &["Kapitel", "Abschnitt", "Teil", "Anhang"])
            || is_all_caps_title(line)
    }

    fn ends_with_complete_sentence(&self, text: &str) -> bool {
        ends_terminal(text)
    }

    fn stop_words(&self) -> &HashSet<&'static str> {
        &self.stop_words
    }
}

// ── Lookup ──────────────────────────────────────────────────────────

/// Resolve a language code to a profile. Uncovered languages fall back to
/// the English-biased profile.
pub fn profile_for(code: &str) -> Arc<dyn LanguageProfile> {
    match code.to_ascii_lowercase().as_str() {
        "en" | "en-us" | "en-gb" => Arc::new(EnglishProfile::new()),
        "de" | "de-de" | "de-at" | "de-ch" => Arc::new(GermanProfile::new()),
        other => {
            debug!(language = other, "no dedicated profile, using English fallback");
            Arc::new(EnglishProfile::new())
        }
    }
}
