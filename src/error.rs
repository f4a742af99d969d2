use std::path::PathBuf;
use thiserror::Error;

/// Main error type for lineage-graph
#[derive(Error, Debug)]
pub enum LineageError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Table parse errors (unsupported format, unreadable structure)
    #[error("Parse error: {0}")]
    Parse(String),

    /// CSV decoding errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Person or relation table absent or empty
    #[error("Data not ready: persons and relations tables are required (missing: {0})")]
    DataNotReady(String),

    /// Relation table present but no triple could be parsed from it
    #[error("No relations parsed: relation table needs source/target columns or a 描述/description column")]
    NoRelations,

    /// Writing the exported artifact failed
    #[error("Export to {} failed: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Preview server errors
    #[error("Server error: {0}")]
    Server(String),
}

/// Convenient Result type using LineageError
pub type Result<T> = std::result::Result<T, LineageError>;
