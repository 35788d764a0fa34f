//! Error types for the proving runtime.
//!
//! Every failure of a register or execute call is one of these variants.
//! Callers branch on [`RuntimeError::kind`] instead of matching messages.

use provevm_core::{CoreError, ProjectId};
use std::time::Duration;
use thiserror::Error;

use crate::engine::EngineError;

/// Discriminant of a [`RuntimeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    MalformedContent,
    Decompression,
    EngineInit,
    EngineExecution,
    DeadlineExceeded,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::MalformedContent => "malformed_content",
            ErrorKind::Decompression => "decompression",
            ErrorKind::EngineInit => "engine_init",
            ErrorKind::EngineExecution => "engine_execution",
            ErrorKind::DeadlineExceeded => "deadline_exceeded",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by the store, dispatcher, and service facade.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// No record registered under this project id
    #[error("projectID '{project_id}' does not exist in the halo2 vm.")]
    NotFound { project_id: ProjectId },

    /// Request rejected before touching the store
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Stored content is not valid hex
    #[error("Malformed project content: {0}")]
    MalformedContent(String),

    /// Stored content is not a valid compressed stream
    #[error("Failed to decompress project content: {0}")]
    Decompression(String),

    /// Engine rejected the program image
    #[error("Proving engine initialization failed: {0}")]
    EngineInit(String),

    /// Engine failed while running the program
    #[error("Proving engine execution failed: {0}")]
    EngineExecution(String),

    /// Engine did not finish within the execution timeout
    #[error("Execution of projectID '{project_id}' exceeded deadline of {}ms", .timeout.as_millis())]
    DeadlineExceeded {
        project_id: ProjectId,
        timeout: Duration,
    },
}

impl RuntimeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RuntimeError::NotFound { .. } => ErrorKind::NotFound,
            RuntimeError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            RuntimeError::MalformedContent(_) => ErrorKind::MalformedContent,
            RuntimeError::Decompression(_) => ErrorKind::Decompression,
            RuntimeError::EngineInit(_) => ErrorKind::EngineInit,
            RuntimeError::EngineExecution(_) => ErrorKind::EngineExecution,
            RuntimeError::DeadlineExceeded { .. } => ErrorKind::DeadlineExceeded,
        }
    }
}

impl From<EngineError> for RuntimeError {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::Init(msg) => RuntimeError::EngineInit(msg),
            EngineError::Execution(msg) => RuntimeError::EngineExecution(msg),
        }
    }
}

impl From<CoreError> for RuntimeError {
    fn from(error: CoreError) -> Self {
        RuntimeError::InvalidArgument(error.to_string())
    }
}

#[cfg(feature = "grpc-server")]
impl From<RuntimeError> for tonic::Status {
    fn from(error: RuntimeError) -> Self {
        let message = error.to_string();
        match error.kind() {
            ErrorKind::NotFound => tonic::Status::not_found(message),
            ErrorKind::InvalidArgument => tonic::Status::invalid_argument(message),
            ErrorKind::MalformedContent | ErrorKind::Decompression => {
                tonic::Status::data_loss(message)
            }
            ErrorKind::EngineInit => tonic::Status::failed_precondition(message),
            ErrorKind::EngineExecution => tonic::Status::internal(message),
            ErrorKind::DeadlineExceeded => tonic::Status::deadline_exceeded(message),
        }
    }
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
