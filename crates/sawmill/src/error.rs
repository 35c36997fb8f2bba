//! Facade error types

use contracts::{ContractError, Level};
use dispatcher::DispatchError;
use thiserror::Error;

/// Errors surfaced by the logger's control and configuration operations
#[derive(Debug, Error)]
pub enum SawmillError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Config(#[from] ContractError),
}

/// Returned by `warn`, `error` and `critical` so the logged message can be
/// propagated as an ordinary error value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LogError {
    pub level: Level,
    pub message: String,
}

impl LogError {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}
