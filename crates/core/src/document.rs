use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A titled section of the source document with its character range.
/// Supplied by the upstream extractor; used to resolve heading paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    /// Nesting depth, 1 = top level.
    pub level: usize,
    pub start_char: usize,
    pub end_char: usize,
}

/// Character range covered by one page of the source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRange {
    /// 1-based page number.
    pub page_number: usize,
    pub start_char: usize,
    pub end_char: usize,
}

/// Extracted document content handed to the chunking engine.
///
/// Parsing/extraction happens upstream; the engine only consumes the flat
/// text plus the section outline and page map for location resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentContent {
    pub text: String,
    pub metadata: HashMap<String, String>,
    pub sections: Vec<Section>,
    pub pages: Vec<PageRange>,
}

impl DocumentContent {
    /// Wrap bare text with no section outline or page map.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Titles of all sections containing `offset`, outermost first.
    pub fn heading_path_at(&self, offset: usize) -> Vec<String> {
        let mut path: Vec<&Section> = self
            .sections
            .iter()
            .filter(|s| s.start_char <= offset && offset < s.end_char)
            .collect();
        path.sort_by_key(|s| s.level);
        path.into_iter().map(|s| s.title.clone()).collect()
    }

    /// Page numbers whose range intersects `[start, end)`, in order.
    pub fn pages_for(&self, start: usize, end: usize) -> Vec<usize> {
        self.pages
            .iter()
            .filter(|p| p.start_char < end && start < p.end_char)
            .map(|p| p.page_number)
            .collect()
    }
}
