//! Structural scanner: headers, list items, and paragraph boundaries with
//! importance weights. First stage of the pipeline, no failure mode.

use serde::Serialize;

/// Kind of a structural element found by the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StructuralKind {
    Header,
    ListItem,
    Paragraph,
}

/// One structural landmark. Read-only after the scan.
#[derive(Debug, Clone, Serialize)]
pub struct StructuralElement {
    pub content: String,
    /// Byte offset of the element start in the source text.
    pub position: usize,
    pub kind: StructuralKind,
    /// Importance in [0, 1].
    pub importance: f64,
}

/// Scan output: three element lists, each ordered by position.
#[derive(Debug, Clone, Default)]
pub struct DocumentStructure {
    pub headers: Vec<StructuralElement>,
    pub list_items: Vec<StructuralElement>,
    pub paragraphs: Vec<StructuralElement>,
}

impl DocumentStructure {
    /// Importance of the paragraph containing `offset`, if any.
    pub fn paragraph_importance_at(&self, offset: usize) -> Option<f64> {
        self.paragraphs
            .iter()
            .rev()
            .find(|p| p.position <= offset && offset < p.position + p.content.len())
            .map(|p| p.importance)
    }

    /// Heading titles in scope at `offset`, outermost first. Used when the
    /// caller supplies no section outline of its own.
    pub fn heading_path_at(&self, offset: usize) -> Vec<String> {
        let mut stack: Vec<(usize, String)> = Vec::new();
        for h in &self.headers {
            if h.position > offset {
                break;
            }
            let level = h.content.chars().take_while(|&c| c == '#').count().max(1);
            let title = h.content.trim_start_matches('#').trim().to_string();
            while stack.last().is_some_and(|(l, _)| *l >= level) {
                stack.pop();
            }
            stack.push((level, title));
        }
        stack.into_iter().map(|(_, title)| title).collect()
    }
}

/// Keywords that mark a paragraph as carrying above-average weight.
const EMPHASIS_KEYWORDS: &[&str] = &[
    "important", "summary", "warning", "note", "critical", "key", "caution",
    "conclusion",
];

/// Markdown heading level, if `line` is a heading.
pub(crate) fn heading_level(line: &str) -> Option<usize> {
    let trimmed = line.trim_start();
    let hashes = trimmed.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&hashes) && trimmed[hashes..].starts_with(' ') {
        Some(hashes)
    } else {
        None
    }
}

/// True if `line` is a markdown list item (`-`/`*`/`+` or `N.`).
pub(crate) fn is_list_item(line: &str) -> bool {
    let trimmed = line.trim_start();
    if let Some(rest) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
        .or_else(|| trimmed.strip_prefix("+ "))
    {
        return !rest.trim().is_empty();
    }
    // Ordered list: digits then ". " or ") ".
    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &trimmed[digits..];
        return rest.starts_with(". ") || rest.starts_with(") ");
    }
    false
}

/// Header importance decays with heading level: 1.0 for level 1 down to
/// 0.5 for level 5 and deeper.
fn header_importance(level: usize) -> f64 {
    (1.0 - 0.125 * (level.saturating_sub(1)) as f64).max(0.5)
}

fn paragraph_importance(text: &str) -> f64 {
    let mut importance: f64 = 0.5;
    if text.len() > 500 {
        importance += 0.2;
    }
    let lower = text.to_lowercase();
    if EMPHASIS_KEYWORDS.iter().any(|k| lower.contains(k)) {
        importance += 0.3;
    }
    importance.min(1.0)
}

/// Scan the full text for structural landmarks. Empty text yields empty
/// lists.
pub fn scan(text: &str) -> DocumentStructure {
    let mut structure = DocumentStructure::default();
    if text.trim().is_empty() {
        return structure;
    }

    // Line-level landmarks.
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let content = line.trim_end_matches('\n');
        if let Some(level) = heading_level(content) {
            structure.headers.push(StructuralElement {
                content: content.trim().to_string(),
                position: offset,
                kind: StructuralKind::Header,
                importance: header_importance(level),
            });
        } else if is_list_item(content) {
            structure.list_items.push(StructuralElement {
                content: content.trim().to_string(),
                position: offset,
                kind: StructuralKind::ListItem,
                importance: 0.6,
            });
        }
        offset += line.len();
    }

    // Paragraphs: blank-line separated blocks.
    let mut para_start = 0;
    for block in text.split("\n\n") {
        let trimmed = block.trim();
        if !trimmed.is_empty() {
            structure.paragraphs.push(StructuralElement {
                content: block.to_string(),
                position: para_start,
                kind: StructuralKind::Paragraph,
                importance: paragraph_importance(trimmed),
            });
        }
        para_start += block.len() + 2;
    }

    structure
}
