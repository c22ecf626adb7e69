use moneywatch_domain::DateWindowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Invalid window: {0}")]
    InvalidWindow(#[from] DateWindowError),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serde(err.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
