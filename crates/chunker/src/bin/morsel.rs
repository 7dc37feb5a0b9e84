//! morsel — chunk a text/markdown file into retrieval-ready JSON chunks.
//!
//! Reads a UTF-8 file, runs the chunking pipeline, and writes one JSON
//! object per chunk to stdout. Summary statistics go to the log.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use morsel_chunker::{ChunkingEngine, ChunkingOptions, ChunkingStrategy, DocumentContent};

// ── CLI ─────────────────────────────────────────────────────────────

/// Semantic chunking engine for RAG pipelines.
#[derive(Parser, Debug)]
#[command(name = "morsel", version, about)]
struct Cli {
    /// Input file (UTF-8 text or markdown).
    input: PathBuf,

    /// Maximum chunk size in characters.
    #[arg(long, env = "MORSEL_MAX_CHUNK_SIZE", default_value_t = 1000)]
    max_chunk_size: usize,

    /// Minimum chunk size in characters.
    #[arg(long, env = "MORSEL_MIN_CHUNK_SIZE", default_value_t = 100)]
    min_chunk_size: usize,

    /// Overlap carried between adjacent chunks, in characters.
    #[arg(long, env = "MORSEL_OVERLAP_SIZE", default_value_t = 100)]
    overlap_size: usize,

    /// Assembly strategy: "smart" or "intelligent".
    #[arg(long, env = "MORSEL_STRATEGY", default_value = "intelligent")]
    strategy: String,

    /// Language code for the sentence/section profile.
    #[arg(long, env = "MORSEL_LANGUAGE", default_value = "en")]
    language: String,

    /// Deduplicate overlap-induced repetition between adjacent chunks.
    #[arg(long)]
    dedup: bool,

    /// Emit the run statistics as a final JSON object on stdout.
    #[arg(long)]
    stats: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let strategy: ChunkingStrategy = cli.strategy.parse()?;
    let options = ChunkingOptions {
        max_chunk_size: cli.max_chunk_size,
        min_chunk_size: cli.min_chunk_size,
        overlap_size: cli.overlap_size,
        language: cli.language.clone(),
        deduplicate_overlaps: cli.dedup,
        strategy,
        ..ChunkingOptions::default()
    };

    let text = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let document = DocumentContent::from_text(text);

    let engine = ChunkingEngine::new(options)?;
    let result = engine.chunk(&document)?;

    info!(
        chunks = result.statistics.total_chunks,
        avg_size = result.statistics.average_chunk_size,
        avg_quality = result.statistics.average_quality,
        "chunking complete"
    );

    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    for chunk in &result.chunks {
        serde_json::to_writer(&mut lock, chunk)?;
        writeln!(lock)?;
    }
    if cli.stats {
        serde_json::to_writer(&mut lock, &result.statistics)?;
        writeln!(lock)?;
    }

    Ok(())
}
