use thiserror::Error;

use crate::oracle::OracleError;

/// Failures surfaced by request-scoped operations.
///
/// Scheduler ticks log these and never propagate them.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("price service unavailable: {0}")]
    ServiceUnavailable(#[from] OracleError),

    #[error("storage failure: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl AppError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
