use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApeironError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ApeironError>;
