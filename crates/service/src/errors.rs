use thiserror::Error;

use models::ModelError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("operation not supported: {0}")]
    NotSupported(&'static str),
    #[error("storage error: {0}")]
    Storage(String),
}

impl ServiceError {
    pub fn no_setting(key: &str) -> Self { Self::NotFound(format!("there is no setting '{}'", key)) }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::InvalidArgument(_) => 1001,
            ServiceError::NotFound(_) => 1003,
            ServiceError::NotSupported(_) => 1005,
            ServiceError::Storage(_) => 1200,
        }
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => ServiceError::InvalidArgument(msg),
        }
    }
}
