//! Error types for export staging

/// Main error type for staging operations
#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<mongodb::error::Error> for StagingError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Result type alias for staging operations
pub type Result<T> = std::result::Result<T, StagingError>;
