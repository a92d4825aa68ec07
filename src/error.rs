use thiserror::Error;

/// Boundary error type; the engine itself returns typed defaults instead
#[derive(Error, Debug)]
pub enum PropError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    Validation(String),

    // Input errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for PropError
pub type Result<T> = std::result::Result<T, PropError>;
