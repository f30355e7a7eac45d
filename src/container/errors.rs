//! # Container Errors
//!
//! Error types for packing compact documents.

use thiserror::Error;

/// Result type for container operations
pub type ContainerResult<T> = Result<T, ContainerError>;

/// Container errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
    /// Input was empty
    #[error("Empty container")]
    Empty,

    /// Document could not be serialized
    #[error("Failed to encode container: {0}")]
    Encode(String),

    /// Bytes are not a valid container
    #[error("Failed to decode container: {0}")]
    Decode(String),
}

impl ContainerError {
    /// Returns the error code string
    pub fn code(&self) -> &'static str {
        match self {
            ContainerError::Empty => "OEM_CONTAINER_EMPTY",
            ContainerError::Encode(_) => "OEM_CONTAINER_ENCODE",
            ContainerError::Decode(_) => "OEM_CONTAINER_DECODE",
        }
    }
}
