use moneywatch_config::ConfigError;
use moneywatch_core::CoreError;
use moneywatch_domain::DateWindowError;
use thiserror::Error;

/// Any failure surfaced by the facade.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Window(#[from] DateWindowError),
}

pub type AppResult<T> = Result<T, AppError>;
