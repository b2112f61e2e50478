//! Error types for flatr
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in flatr
#[derive(Debug, Error)]
pub enum FlatrError {
    /// Flattening requires the collection's adaptive scheduler
    #[error("Adaptive scheduling is not enabled for this collection")]
    AdaptiveSchedulerDisabled,

    /// The flatten limit must be a positive integer
    #[error("Invalid flatten limit: {0} (must be a positive integer)")]
    InvalidLimit(i64),

    /// Deck not found in the collection
    #[error("Deck not found: {0}")]
    DeckNotFound(String),

    /// Nothing to undo
    #[error("Nothing to undo: {0}")]
    NothingToUndo(String),

    /// Storage/persistence error
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite error
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration error
    #[error("Config error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for flatr operations
pub type Result<T> = std::result::Result<T, FlatrError>;
