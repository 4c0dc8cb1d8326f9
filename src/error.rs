use thiserror::Error;

/// Main error type for the scoring service
#[derive(Error, Debug)]
pub enum CredintError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // Cache errors
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Cache error: {0}")]
    Cache(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Signal errors
    #[error("Signal unavailable for {entity}: {reason}")]
    SignalUnavailable { entity: String, reason: String },

    #[error("Timed out: {0}")]
    Timeout(String),

    // Model errors
    #[error("Model error: {0}")]
    Model(String),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for CredintError
pub type Result<T> = std::result::Result<T, CredintError>;

/// Errors raised while validating or evaluating a scoring model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("feature dimension mismatch: got {got}, expected {expected}")]
    DimensionMismatch { got: usize, expected: usize },

    #[error("non-finite model output: {value}")]
    NonFiniteOutput { value: f64 },

    #[error("feature order mismatch at index {index}: got {got}, expected {expected}")]
    FeatureOrder {
        index: usize,
        got: String,
        expected: String,
    },

    #[error("invalid artifact: {0}")]
    InvalidArtifact(String),
}

impl From<ModelError> for CredintError {
    fn from(err: ModelError) -> Self {
        CredintError::Model(err.to_string())
    }
}
