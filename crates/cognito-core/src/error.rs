use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Missing or malformed caller input. Recovered at the transport boundary.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Storage failure: {0}")]
    Storage(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Stable tag for the error family, suitable for logs and responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidConfig(_) => "invalid_config",
            Error::Validation(_) => "validation",
            Error::Embedding(_) => "embedding",
            Error::Storage(_) => "storage",
            Error::InvalidArgument(_) => "invalid_argument",
        }
    }

    pub fn storage(err: impl std::fmt::Display) -> Self {
        Error::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
