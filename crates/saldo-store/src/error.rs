//! Error types for saldo-store

use saldo_core::CoreError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Transaction not found: {id}")]
    NotFound { id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Unsupported store URI: {uri}")]
    UnsupportedUri { uri: String },

    #[error("Corrupt document file {path}: {message}")]
    Corrupt { path: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl StoreError {
    /// Whether the failure was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(self, StoreError::NotFound { .. } | StoreError::Validation { .. })
    }
}

impl From<CoreError> for StoreError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::ValidationError { message } => StoreError::Validation { message },
            CoreError::TransactionNotFound { id } => StoreError::NotFound { id },
            CoreError::IoError(e) => StoreError::IoError(e),
            other => StoreError::Validation {
                message: other.to_string(),
            },
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { id } => CoreError::TransactionNotFound { id },
            StoreError::Validation { message } => CoreError::ValidationError { message },
            other => CoreError::StoreError {
                message: other.to_string(),
            },
        }
    }
}

/// Result type with StoreError
pub type StoreResult<T> = Result<T, StoreError>;
