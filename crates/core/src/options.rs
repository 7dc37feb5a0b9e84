use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChunkError;

/// Assembly strategy. Supplied by an external advisor as a name plus size
/// parameters; unrecognized names are rejected, never silently defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkingStrategy {
    /// Sentence-completeness driven accumulator.
    Smart,
    /// Structure-aware accumulator: table atomicity, header-forced flushes.
    Intelligent,
}

impl FromStr for ChunkingStrategy {
    type Err = ChunkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "smart" => Ok(ChunkingStrategy::Smart),
            "intelligent" => Ok(ChunkingStrategy::Intelligent),
            other => Err(ChunkError::UnknownStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for ChunkingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkingStrategy::Smart => write!(f, "smart"),
            ChunkingStrategy::Intelligent => write!(f, "intelligent"),
        }
    }
}

/// Configuration for one chunking run. Immutable once the engine is built.
///
/// Sizes are in characters of the source text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingOptions {
    /// Hard size ceiling per chunk (default: 1000).
    pub max_chunk_size: usize,
    /// Chunks below this are merge candidates (default: 100).
    pub min_chunk_size: usize,
    /// Target overlap carried from one chunk into the next (default: 100).
    pub overlap_size: usize,
    /// Language code for the sentence/section profile (default: "en").
    pub language: String,
    /// Keep paragraph boundaries intact where possible.
    pub preserve_paragraphs: bool,
    /// Keep sentence boundaries intact where possible.
    pub preserve_sentences: bool,
    /// Run the overlap deduplication pass after assembly.
    pub deduplicate_overlaps: bool,
    /// Force a flush when a section header arrives and the accumulator
    /// already holds at least `header_fill_ratio` of the maximum.
    pub separate_headers: bool,
    /// Fill ratio gating header-forced flushes (default: 0.3).
    pub header_fill_ratio: f64,
    /// Assembly strategy.
    pub strategy: ChunkingStrategy,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            max_chunk_size: 1000,
            min_chunk_size: 100,
            overlap_size: 100,
            language: "en".to_string(),
            preserve_paragraphs: true,
            preserve_sentences: true,
            deduplicate_overlaps: false,
            separate_headers: true,
            header_fill_ratio: 0.3,
            strategy: ChunkingStrategy::Intelligent,
        }
    }
}

impl ChunkingOptions {
    /// Validate size relationships. Called once at engine construction.
    pub fn validate(&self) -> Result<(), ChunkError> {
        if self.max_chunk_size == 0 {
            return Err(ChunkError::InvalidOptions(
                "max_chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.min_chunk_size >= self.max_chunk_size {
            return Err(ChunkError::InvalidOptions(format!(
                "min_chunk_size ({}) must be below max_chunk_size ({})",
                self.min_chunk_size, self.max_chunk_size
            )));
        }
        if self.overlap_size >= self.max_chunk_size {
            return Err(ChunkError::InvalidOptions(format!(
                "overlap_size ({}) must be below max_chunk_size ({})",
                self.overlap_size, self.max_chunk_size
            )));
        }
        if !(0.0..=1.0).contains(&self.header_fill_ratio) {
            return Err(ChunkError::InvalidOptions(format!(
                "header_fill_ratio ({}) must be within [0, 1]",
                self.header_fill_ratio
            )));
        }
        Ok(())
    }

    /// Effective size ceiling: table-bearing documents get double the
    /// configured maximum so folded tables are not casually split.
    pub fn effective_max_size(&self, has_tables: bool) -> usize {
        if has_tables {
            self.max_chunk_size * 2
        } else {
            self.max_chunk_size
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_valid() {
        assert!(ChunkingOptions::default().validate().is_ok());
    }

    #[test]
    fn min_above_max_rejected() {
        let opts = ChunkingOptions {
            max_chunk_size: 100,
            min_chunk_size: 100,
            ..ChunkingOptions::default()
        };
        assert!(matches!(
            opts.validate(),
            Err(ChunkError::InvalidOptions(_))
        ));
    }

    #[test]
    fn overlap_above_max_rejected() {
        let opts = ChunkingOptions {
            max_chunk_size: 100,
            min_chunk_size: 10,
            overlap_size: 100,
            ..ChunkingOptions::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn strategy_parses_known_names() {
        assert_eq!(
            "smart".parse::<ChunkingStrategy>().unwrap(),
            ChunkingStrategy::Smart
        );
        assert_eq!(
            "Intelligent".parse::<ChunkingStrategy>().unwrap(),
            ChunkingStrategy::Intelligent
        );
    }

    #[test]
    fn unknown_strategy_rejected() {
        let err = "adaptive".parse::<ChunkingStrategy>().unwrap_err();
        assert!(matches!(err, ChunkError::UnknownStrategy(_)));
    }

    #[test]
    fn table_documents_double_the_ceiling() {
        let opts = ChunkingOptions::default();
        assert_eq!(opts.effective_max_size(false), 1000);
        assert_eq!(opts.effective_max_size(true), 2000);
    }
}
