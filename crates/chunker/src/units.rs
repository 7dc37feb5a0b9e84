//! Semantic unit extractor: walks lines, folds contiguous table lines into
//! one atomic unit, and tags each unit with weight/relevance/importance.
//!
//! Units are the atoms the assembler packs; a folded table is indivisible
//! downstream unless it alone exceeds 2.5× the size ceiling.

use std::collections::{HashMap, HashSet};

use crate::language::LanguageProfile;
use crate::structure::DocumentStructure;
use crate::text::keywords;

/// Kind of a semantic unit, used by the structure-aware assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Text,
    Header,
    ListItem,
    Table,
}

/// Atomic element fed to the assembler: one line, or one folded table
/// block. Immutable once produced.
#[derive(Debug, Clone)]
pub struct SemanticUnit {
    pub content: String,
    /// Byte offset of the unit start in the source text.
    pub position: usize,
    pub semantic_weight: f64,
    pub contextual_relevance: f64,
    pub importance: f64,
    pub is_section_header: bool,
    pub kind: UnitKind,
}

impl SemanticUnit {
    pub fn is_table(&self) -> bool {
        self.kind == UnitKind::Table
    }
}

/// A table line carries at least two pipes, or is an explicit marker.
pub(crate) fn is_table_line(line: &str) -> bool {
    let trimmed = line.trim();
    if is_table_marker(trimmed) {
        return true;
    }
    trimmed.matches('|').count() >= 2
}

fn is_table_marker(trimmed: &str) -> bool {
    trimmed.eq_ignore_ascii_case("<table>") || trimmed.eq_ignore_ascii_case("</table>")
}

/// Length-driven weight for plain text lines: short fragments carry little
/// semantic payload, full sentences approach 1.0.
fn text_weight(len: usize) -> f64 {
    (0.3 + len as f64 / 200.0).min(1.0)
}

/// Walk `text` line by line, producing one unit per non-blank line and one
/// folded unit per table block. Blank lines only advance the cursor.
pub fn extract_units(
    text: &str,
    structure: &DocumentStructure,
    profile: &dyn LanguageProfile,
) -> Vec<SemanticUnit> {
    let mut units: Vec<SemanticUnit> = Vec::new();

    // Line classification comes from the structural scan.
    let header_importance: HashMap<usize, f64> = structure
        .headers
        .iter()
        .map(|h| (h.position, h.importance))
        .collect();
    let list_positions: HashSet<usize> =
        structure.list_items.iter().map(|e| e.position).collect();

    let mut table_buf: Vec<&str> = Vec::new();
    let mut table_start = 0;
    let mut in_marker_block = false;

    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        let trimmed = content.trim();

        let table_line = if in_marker_block {
            true
        } else {
            is_table_line(content) && !trimmed.is_empty()
        };

        if table_line {
            if table_buf.is_empty() {
                table_start = offset;
            }
            table_buf.push(content);
            if is_table_marker(trimmed) {
                // Opening marker starts a block, closing marker ends it.
                in_marker_block = !in_marker_block && !trimmed.starts_with("</");
                if trimmed.starts_with("</") {
                    in_marker_block = false;
                    flush_table(&mut units, &mut table_buf, table_start);
                }
            }
            offset += line.len();
            continue;
        }

        // A non-table line closes any open pipe-delimited run.
        if !table_buf.is_empty() && !in_marker_block {
            flush_table(&mut units, &mut table_buf, table_start);
        }

        if trimmed.is_empty() {
            offset += line.len();
            continue;
        }

        let (kind, importance, is_section_header) =
            if let Some(&imp) = header_importance.get(&offset) {
                (UnitKind::Header, imp, true)
            } else if profile.is_section_marker(content) {
                (UnitKind::Header, 0.9, true)
            } else if list_positions.contains(&offset) {
                (UnitKind::ListItem, 0.6, false)
            } else {
                let importance = structure.paragraph_importance_at(offset).unwrap_or(0.5);
                (UnitKind::Text, importance, false)
            };

        units.push(SemanticUnit {
            content: content.to_string(),
            position: offset,
            semantic_weight: match kind {
                UnitKind::Header => 0.9,
                UnitKind::ListItem => 0.6,
                UnitKind::Text => text_weight(trimmed.len()),
                UnitKind::Table => 1.0,
            },
            contextual_relevance: 0.5, // refined below against the neighbor
            importance,
            is_section_header,
            kind,
        });
        offset += line.len();
    }

    if !table_buf.is_empty() {
        flush_table(&mut units, &mut table_buf, table_start);
    }

    refine_relevance(&mut units, profile.stop_words());
    units
}

fn flush_table(units: &mut Vec<SemanticUnit>, buf: &mut Vec<&str>, start: usize) {
    let content = buf.join("\n");
    buf.clear();
    if content.trim().is_empty() {
        return;
    }
    units.push(SemanticUnit {
        content,
        position: start,
        semantic_weight: 1.0,
        contextual_relevance: 1.0,
        importance: 0.9,
        is_section_header: false,
        kind: UnitKind::Table,
    });
}

/// Contextual relevance: keyword continuity with the previous unit. Tables
/// keep their fixed 1.0.
fn refine_relevance(units: &mut [SemanticUnit], stop_words: &HashSet<&'static str>) {
    for i in 1..units.len() {
        if units[i].kind == UnitKind::Table {
            continue;
        }
        let prev = keywords(&units[i - 1].content, stop_words, 3);
        let cur = keywords(&units[i].content, stop_words, 3);
        units[i].contextual_relevance = crate::text::jaccard(&prev, &cur).max(0.1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::EnglishProfile;
    use crate::structure::scan;

    fn units_of(text: &str) -> Vec<SemanticUnit> {
        let structure = scan(text);
        extract_units(text, &structure, &EnglishProfile::new())
    }

    #[test]
    fn blank_lines_produce_no_units() {
        let units = units_of("first line\n\n\nsecond line\n");
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].content, "first line");
        assert_eq!(units[1].content, "second line");
    }

    #[test]
    fn positions_track_blank_lines() {
        let units = units_of("first line\n\nsecond line\n");
        assert_eq!(units[0].position, 0);
        assert_eq!(units[1].position, 12);
    }

    #[test]
    fn pipe_rows_fold_into_one_table_unit() {
        let text = "before\n| a | b |\n|---|---|\n| 1 | 2 |\nafter\n";
        let units = units_of(text);
        assert_eq!(units.len(), 3);
        assert!(units[1].is_table());
        assert_eq!(units[1].content, "| a | b |\n|---|---|\n| 1 | 2 |");
        assert_eq!(units[1].importance, 0.9);
        assert_eq!(units[1].semantic_weight, 1.0);
    }

    #[test]
    fn marker_block_folds_everything_between() {
        let text = "<table>\nrow one\nrow two\n</table>\ntail\n";
        let units = units_of(text);
        assert_eq!(units.len(), 2);
        assert!(units[0].is_table());
        assert!(units[0].content.contains("row one"));
        assert!(units[0].content.contains("</table>"));
        assert_eq!(units[1].content, "tail");
    }

    #[test]
    fn markdown_headings_are_flagged() {
        let units = units_of("## Setup\nBody text here.\n");
        assert!(units[0].is_section_header);
        assert_eq!(units[0].kind, UnitKind::Header);
        assert!(!units[1].is_section_header);
    }

    #[test]
    fn language_section_markers_are_flagged() {
        let units = units_of("Chapter 2\nThe story continues.\n");
        assert!(units[0].is_section_header);
    }

    #[test]
    fn single_pipe_is_not_a_table() {
        let units = units_of("a | b\n");
        assert_eq!(units.len(), 1);
        assert!(!units[0].is_table());
    }

    #[test]
    fn trailing_table_is_flushed() {
        let units = units_of("intro\n| x | y |\n| 1 | 2 |");
        assert_eq!(units.len(), 2);
        assert!(units[1].is_table());
    }

    #[test]
    fn relevance_reflects_keyword_continuity() {
        let units = units_of(
            "The reactor core temperature rose sharply today.\nReactor temperature readings exceeded limits.\nUnrelated gardening advice follows instead.\n",
        );
        assert!(units[1].contextual_relevance > units[2].contextual_relevance);
    }
}
