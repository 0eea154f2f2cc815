use thiserror::Error;

use crate::auth::JwtError;
use crate::orders::{ManagerError, StorageError};

/// Startup and runtime failures of the server process itself
///
/// Request-level failures are rendered as [`shared::AppError`]; this type
/// covers what happens before the router is up and while it is serving.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("JWT error: {0}")]
    Jwt(#[from] JwtError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ManagerError> for ServerError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::Storage(e) => Self::Storage(e),
            other => Self::Internal(anyhow::anyhow!(other)),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
