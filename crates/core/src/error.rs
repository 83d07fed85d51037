//! Error types for the core library

use thiserror::Error;

use crate::task::TaskId;

/// Faults raised by the persistence layer.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Failure outcome of a repository operation.
///
/// Store faults are wrapped per operation kind so callers get a generic,
/// human-readable message while the source stays available for diagnostics.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("Failed to load tasks")]
    Load(#[source] Error),

    #[error("Failed to add task")]
    Add(#[source] Error),

    #[error("Failed to update task")]
    Update(#[source] Error),

    #[error("Failed to delete task")]
    Delete(#[source] Error),

    #[error("Task not found: {0}")]
    NotFound(TaskId),
}
