use thiserror::Error;

/// Result type for reliquary operations
pub type Result<T> = std::result::Result<T, ReliquaryError>;

/// Unified error type for all reliquary operations
#[derive(Debug, Error)]
pub enum ReliquaryError {
    // Open errors
    #[error("Invalid archive path: {0}")]
    InvalidPath(String),

    // Storage errors
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    // Lookup errors (these abort the enclosing batch)
    #[error("Entry not found in archive: {0}")]
    EntryNotFound(String),

    #[error("Alias target not found: {target} (aliased from {name})")]
    AliasNotFound { name: String, target: String },

    // Codec errors
    #[error("Empty compressed input")]
    EmptyInput,

    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}
