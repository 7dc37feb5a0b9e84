//! Semantic chunking engine.
//!
//! Splits extracted document text into bounded-size, semantically coherent
//! chunks for retrieval, preserving sentence/table/list integrity and
//! carrying adaptive overlap between adjacent chunks.
//!
//! Pipeline: structural scan → semantic unit extraction → greedy assembly
//! (smart or intelligent strategy, consulting the boundary evaluator and
//! overlap manager) → size enforcement and merge passes → quality scoring →
//! finalization (ordinals, prev/next links, location resolution).

pub mod assembler;
pub mod boundary;
pub mod engine;
pub mod language;
pub mod optimizer;
pub mod overlap;
pub mod quality;
pub mod structure;
mod text;
pub mod units;

pub use engine::ChunkingEngine;
pub use language::{profile_for, LanguageProfile};

pub use morsel_core::{
    CancelFlag, ChunkError, ChunkingOptions, ChunkingResult, ChunkingStatistics,
    ChunkingStrategy, DocumentChunk, DocumentContent,
};
