use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChunkError {
    #[error("Invalid chunking options: {0}")]
    InvalidOptions(String),

    #[error("Unknown chunking strategy: {0}")]
    UnknownStrategy(String),

    #[error("Chunking cancelled")]
    Cancelled,
}
